//! Per-employee income and contribution totals over a reporting period.
//!
//! The aggregator is a left join of employees onto income transactions:
//! every employee produces exactly one row, whether or not any transaction
//! falls inside the window. Transactions outside the window are ignored.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use retire_core::calculations::SummaryAggregator;
//! use retire_core::period::ReportingPeriod;
//! use retire_core::{Employee, IncomeRecord, IncomeType};
//!
//! let employees = vec![Employee {
//!     id: 1,
//!     name: "Ada Park".to_string(),
//!     department: None,
//!     eligible: true,
//! }];
//! let income = vec![IncomeRecord {
//!     id: 1,
//!     employee_id: 1,
//!     amount: dec!(1000),
//!     date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
//!     income_type: IncomeType::Salary,
//! }];
//!
//! let period = ReportingPeriod::fiscal_year(2025).unwrap();
//! let summary = SummaryAggregator::new(dec!(5.0))
//!     .aggregate(period, &employees, &income, dec!(0))
//!     .unwrap();
//!
//! assert_eq!(summary.rows[0].contribution, dec!(50));
//! assert_eq!(summary.totals.net_spend, dec!(1050));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::contribution::contribution;
use crate::error::EngineError;
use crate::models::{AttendanceRecord, AttendanceStatus, Department, Employee, IncomeRecord};
use crate::period::{DateWindow, ReportingPeriod};

/// One employee's actual totals for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub employee_id: i64,
    pub name: String,
    pub department: Option<Department>,
    pub total_income: Decimal,
    pub contribution: Decimal,
    pub eligible: bool,
}

/// Column sums for a period plus the employer's net spend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub total_income: Decimal,
    pub total_contribution: Decimal,
    /// Recorded taxable profit for the active year (0 when none recorded).
    pub taxable_profit: Decimal,
    /// `total_income + total_contribution - taxable_profit`
    pub net_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: ReportingPeriod,
    pub rows: Vec<SummaryRow>,
    pub totals: PeriodTotals,
}

/// A sortable summary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryColumn {
    Id,
    Name,
    Department,
    TotalIncome,
    Contribution,
    Eligible,
}

impl SummaryColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Department => "department",
            Self::TotalIncome => "income",
            Self::Contribution => "contribution",
            Self::Eligible => "eligible",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "department" | "dept" => Some(Self::Department),
            "income" | "total_income" => Some(Self::TotalIncome),
            "contribution" => Some(Self::Contribution),
            "eligible" | "eligibility" => Some(Self::Eligible),
            _ => None,
        }
    }

    fn compare(
        &self,
        a: &SummaryRow,
        b: &SummaryRow,
    ) -> Ordering {
        match self {
            Self::Id => a.employee_id.cmp(&b.employee_id),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Department => department_key(a).cmp(&department_key(b)),
            Self::TotalIncome => a.total_income.cmp(&b.total_income),
            Self::Contribution => a.contribution.cmp(&b.contribution),
            Self::Eligible => a.eligible.cmp(&b.eligible),
        }
    }
}

fn department_key(row: &SummaryRow) -> &'static str {
    row.department.map(|d| d.as_str()).unwrap_or("")
}

impl PeriodSummary {
    /// Rows whose name or department contains `query`, ignoring case. An
    /// empty query matches every row.
    pub fn filter(
        &self,
        query: &str,
    ) -> Vec<&SummaryRow> {
        let needle = query.trim().to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row.name.to_lowercase().contains(&needle)
                    || department_key(row).to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Stable in-place sort. Text columns compare case-insensitively.
    pub fn sort_by(
        &mut self,
        column: SummaryColumn,
        descending: bool,
    ) {
        self.rows.sort_by(|a, b| {
            let ordering = column.compare(a, b);
            if descending { ordering.reverse() } else { ordering }
        });
    }

    pub fn row(
        &self,
        employee_id: i64,
    ) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.employee_id == employee_id)
    }
}

/// Builds [`PeriodSummary`] values at a fixed contribution percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryAggregator {
    percentage: Decimal,
}

impl SummaryAggregator {
    pub fn new(percentage: Decimal) -> Self {
        Self { percentage }
    }

    /// Sums in-window income per employee and derives contributions and
    /// period totals in one pass.
    ///
    /// Rows come out in ascending employee id. Transactions that reference an
    /// unknown employee are skipped.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidValue`] when a sum or contribution does not fit
    /// in a `Decimal`.
    pub fn aggregate(
        &self,
        period: ReportingPeriod,
        employees: &[Employee],
        income: &[IncomeRecord],
        taxable_profit: Decimal,
    ) -> Result<PeriodSummary, EngineError> {
        let mut income_by_employee: BTreeMap<i64, Decimal> = employees
            .iter()
            .map(|employee| (employee.id, Decimal::ZERO))
            .collect();

        for record in income.iter().filter(|r| period.window.contains(r.date)) {
            match income_by_employee.get_mut(&record.employee_id) {
                Some(total) => {
                    *total = total
                        .checked_add(record.amount)
                        .ok_or_else(|| EngineError::out_of_range("employee income"))?;
                }
                None => warn!(
                    income_id = record.id,
                    employee_id = record.employee_id,
                    "skipping income record for unknown employee"
                ),
            }
        }

        let mut ordered: Vec<&Employee> = employees.iter().collect();
        ordered.sort_by_key(|employee| employee.id);

        let mut totals = PeriodTotals {
            taxable_profit,
            ..PeriodTotals::default()
        };
        let mut rows = Vec::with_capacity(ordered.len());

        for employee in ordered {
            let total_income = income_by_employee
                .get(&employee.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let contribution = contribution(total_income, employee.eligible, self.percentage)?;

            totals.total_income = totals
                .total_income
                .checked_add(total_income)
                .ok_or_else(|| EngineError::out_of_range("total income"))?;
            totals.total_contribution = totals
                .total_contribution
                .checked_add(contribution)
                .ok_or_else(|| EngineError::out_of_range("total contribution"))?;

            rows.push(SummaryRow {
                employee_id: employee.id,
                name: employee.name.clone(),
                department: employee.department,
                total_income,
                contribution,
                eligible: employee.eligible,
            });
        }

        totals.net_spend = totals
            .total_income
            .checked_add(totals.total_contribution)
            .and_then(|spend| spend.checked_sub(taxable_profit))
            .ok_or_else(|| EngineError::out_of_range("net spend"))?;

        debug!(
            period = %period.label,
            rows = rows.len(),
            total_income = %totals.total_income,
            "aggregated period summary"
        );

        Ok(PeriodSummary {
            period,
            rows,
            totals,
        })
    }
}

/// One employee's totals and attendance over a window, for side-by-side
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    pub employee_id: i64,
    pub name: String,
    pub department: Option<Department>,
    pub total_income: Decimal,
    pub contribution: Decimal,
    pub eligible: bool,
    pub absences: usize,
    pub tardies: usize,
}

impl EmployeeSnapshot {
    /// Records belonging to other employees or falling outside `window` are
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidValue`] when the income total or contribution
    /// does not fit in a `Decimal`.
    pub fn compute(
        employee: &Employee,
        income: &[IncomeRecord],
        attendance: &[AttendanceRecord],
        window: DateWindow,
        percentage: Decimal,
    ) -> Result<Self, EngineError> {
        let total_income = income
            .iter()
            .filter(|r| r.employee_id == employee.id && window.contains(r.date))
            .try_fold(Decimal::ZERO, |total, r| total.checked_add(r.amount))
            .ok_or_else(|| EngineError::out_of_range("employee income"))?;

        let in_window: Vec<&AttendanceRecord> = attendance
            .iter()
            .filter(|r| r.employee_id == employee.id && window.contains(r.date))
            .collect();
        let count = |status: AttendanceStatus| in_window.iter().filter(|r| r.status == status).count();

        Ok(Self {
            employee_id: employee.id,
            name: employee.name.clone(),
            department: employee.department,
            total_income,
            contribution: contribution(total_income, employee.eligible, percentage)?,
            eligible: employee.eligible,
            absences: count(AttendanceStatus::Absent),
            tardies: count(AttendanceStatus::Tardy),
        })
    }
}
