use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::period::DateWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeType {
    Salary,
    Bonus,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Bonus => "Bonus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("salary") => Some(Self::Salary),
            s if s.eq_ignore_ascii_case("bonus") => Some(Self::Bonus),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncomeType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dated payment to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub employee_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub income_type: IncomeType,
}

impl IncomeRecord {
    /// Rejects a non-positive amount.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_amount(self.amount)
    }
}

/// For creating new income records (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncomeRecord {
    pub employee_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub income_type: IncomeType,
}

impl NewIncomeRecord {
    /// Rejects a non-positive amount.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_amount(self.amount)
    }
}

fn validate_amount(amount: Decimal) -> Result<(), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::invalid_value(format!(
            "income amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Narrows an income listing. Both fields are optional; an empty filter
/// returns every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncomeFilter {
    pub employee_id: Option<i64>,
    pub window: Option<DateWindow>,
}

impl IncomeFilter {
    pub fn for_employee(employee_id: i64) -> Self {
        Self {
            employee_id: Some(employee_id),
            window: None,
        }
    }

    pub fn within(
        mut self,
        window: DateWindow,
    ) -> Self {
        self.window = Some(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn record(amount: Decimal) -> NewIncomeRecord {
        NewIncomeRecord {
            employee_id: 1,
            amount,
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            income_type: IncomeType::Salary,
        }
    }

    #[test]
    fn income_type_round_trips_labels() {
        assert_eq!(IncomeType::parse("Salary"), Some(IncomeType::Salary));
        assert_eq!(IncomeType::parse("bonus"), Some(IncomeType::Bonus));
        assert_eq!(IncomeType::parse("Commission"), None);
        assert_eq!(IncomeType::Bonus.to_string(), "Bonus");
    }

    #[test]
    fn positive_amount_is_valid() {
        assert_eq!(record(dec!(0.01)).validate(), Ok(()));
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert!(matches!(
            record(dec!(0)).validate(),
            Err(EngineError::InvalidValue(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(matches!(
            record(dec!(-10)).validate(),
            Err(EngineError::InvalidValue(_))
        ));
    }

    #[test]
    fn filter_builder_sets_both_fields() {
        let window = DateWindow::fiscal_year(2025).unwrap();
        let filter = IncomeFilter::for_employee(7).within(window);

        assert_eq!(filter.employee_id, Some(7));
        assert_eq!(filter.window, Some(window));
    }
}
