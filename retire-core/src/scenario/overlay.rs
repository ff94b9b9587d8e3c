//! In-memory "what-if" values per employee.
//!
//! The overlay starts empty. [`HypotheticalOverlay::seed_from`] copies actual
//! totals for employees not yet present, and edits then diverge from actuals
//! without touching stored data. An entry is only dropped when its employee is
//! deleted or the whole overlay is cleared.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::aggregation::PeriodSummary;
use crate::calculations::contribution::{contribution, implied_income};
use crate::error::EngineError;

/// Hypothetical values for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypotheticalEntry {
    pub income: Decimal,
    pub contribution: Decimal,
    pub eligible: bool,
}

/// Which hypothetical field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HypotheticalField {
    Income,
    Contribution,
    Eligibility,
}

impl HypotheticalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Contribution => "contribution",
            Self::Eligibility => "eligible",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" | "total_income" => Some(Self::Income),
            "contribution" => Some(Self::Contribution),
            "eligible" | "eligibility" => Some(Self::Eligibility),
            _ => None,
        }
    }
}

/// A single-field edit with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypotheticalEdit {
    Income(Decimal),
    Contribution(Decimal),
    Eligibility(bool),
}

impl HypotheticalEdit {
    pub fn field(&self) -> HypotheticalField {
        match self {
            Self::Income(_) => HypotheticalField::Income,
            Self::Contribution(_) => HypotheticalField::Contribution,
            Self::Eligibility(_) => HypotheticalField::Eligibility,
        }
    }
}

/// Hypothetical entries keyed by employee id, iterated in ascending id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HypotheticalOverlay {
    entries: BTreeMap<i64, HypotheticalEntry>,
}

impl HypotheticalOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies actual values for every row whose employee has no entry yet.
    /// Existing entries keep their edited values. Returns how many entries
    /// were added.
    pub fn seed_from(
        &mut self,
        summary: &PeriodSummary,
    ) -> usize {
        let mut seeded = 0;
        for row in &summary.rows {
            self.entries.entry(row.employee_id).or_insert_with(|| {
                seeded += 1;
                HypotheticalEntry {
                    income: row.total_income,
                    contribution: row.contribution,
                    eligible: row.eligible,
                }
            });
        }
        if seeded > 0 {
            debug!(seeded, period = %summary.period.label, "seeded hypothetical overlay");
        }
        seeded
    }

    /// Applies `edit` to the entry for `employee_id` at `percentage`.
    ///
    /// - Income: contribution follows the new income when eligible, and is
    ///   left alone otherwise.
    /// - Contribution: income is back-derived when eligible and the rate is
    ///   non-zero, and is left alone otherwise.
    /// - Eligibility: contribution becomes `income * rate` or 0. Income is
    ///   untouched.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidValue`] for a negative amount, an employee with
    /// no entry, or a derived value too large to represent. A rejected edit
    /// changes nothing.
    pub fn apply_edit(
        &mut self,
        employee_id: i64,
        edit: HypotheticalEdit,
        percentage: Decimal,
    ) -> Result<HypotheticalEntry, EngineError> {
        let entry = self.entries.get_mut(&employee_id).ok_or_else(|| {
            EngineError::invalid_value(format!(
                "employee {employee_id} has no hypothetical entry"
            ))
        })?;

        let mut updated = *entry;
        match edit {
            HypotheticalEdit::Income(income) => {
                ensure_non_negative(edit.field(), income)?;
                updated.income = income;
                if updated.eligible {
                    updated.contribution = contribution(income, true, percentage)?;
                }
            }
            HypotheticalEdit::Contribution(amount) => {
                ensure_non_negative(edit.field(), amount)?;
                updated.contribution = amount;
                if updated.eligible {
                    if let Some(income) = implied_income(amount, percentage)? {
                        updated.income = income;
                    }
                }
            }
            HypotheticalEdit::Eligibility(eligible) => {
                updated.eligible = eligible;
                updated.contribution = contribution(updated.income, eligible, percentage)?;
            }
        }
        *entry = updated;

        debug!(
            employee_id,
            field = edit.field().as_str(),
            income = %updated.income,
            contribution = %updated.contribution,
            eligible = updated.eligible,
            "applied hypothetical edit"
        );

        Ok(updated)
    }

    pub fn get(
        &self,
        employee_id: i64,
    ) -> Option<&HypotheticalEntry> {
        self.entries.get(&employee_id)
    }

    pub fn contains(
        &self,
        employee_id: i64,
    ) -> bool {
        self.entries.contains_key(&employee_id)
    }

    /// Drops the entry of a deleted employee.
    pub fn remove(
        &mut self,
        employee_id: i64,
    ) -> Option<HypotheticalEntry> {
        self.entries.remove(&employee_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &HypotheticalEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn ensure_non_negative(
    field: HypotheticalField,
    value: Decimal,
) -> Result<(), EngineError> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_value(format!(
            "hypothetical {} must be non-negative, got {value}",
            field.as_str()
        )));
    }
    Ok(())
}
