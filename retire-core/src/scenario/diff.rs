//! Differences between the actual summary and the hypothetical overlay.
//!
//! Each employee present on both sides is compared field by field, in the
//! order income, contribution, eligibility. Values compare numerically, so
//! `100` and `100.00` are equal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::aggregation::{PeriodSummary, SummaryRow};
use crate::format::{display_name, format_currency, yes_no};
use crate::period::PeriodLabel;
use crate::scenario::overlay::HypotheticalOverlay;

/// One field that differs, with its actual and hypothetical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldChange {
    Income { from: Decimal, to: Decimal },
    Contribution { from: Decimal, to: Decimal },
    Eligibility { from: bool, to: bool },
}

impl FieldChange {
    fn describe(&self) -> String {
        match self {
            Self::Income { from, to } => format!(
                "Change Total Income from {} to {}",
                format_currency(*from),
                format_currency(*to)
            ),
            Self::Contribution { from, to } => format!(
                "Change Contribution from {} to {}",
                format_currency(*from),
                format_currency(*to)
            ),
            Self::Eligibility { from, to } => format!(
                "Change Retirement Eligibility from {} to {}",
                yes_no(*from),
                yes_no(*to)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioChange {
    pub employee_id: i64,
    pub name: String,
    pub change: FieldChange,
}

impl ScenarioChange {
    fn render(
        &self,
        privacy: bool,
    ) -> String {
        format!("{}: {}", display_name(&self.name, privacy), self.change.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDiff {
    pub period: PeriodLabel,
    pub changes: Vec<ScenarioChange>,
}

impl ScenarioDiff {
    /// Compares every summary row that has an overlay entry. Overlay entries
    /// without a row, and rows without an entry, are skipped.
    pub fn compute(
        actual: &PeriodSummary,
        overlay: &HypotheticalOverlay,
    ) -> Self {
        let mut rows: Vec<&SummaryRow> = actual.rows.iter().collect();
        rows.sort_by_key(|row| row.employee_id);

        let mut changes = Vec::new();
        for row in rows {
            let Some(entry) = overlay.get(row.employee_id) else {
                continue;
            };

            let mut push = |change: FieldChange| {
                changes.push(ScenarioChange {
                    employee_id: row.employee_id,
                    name: row.name.clone(),
                    change,
                });
            };

            if entry.income != row.total_income {
                push(FieldChange::Income {
                    from: row.total_income,
                    to: entry.income,
                });
            }
            if entry.contribution != row.contribution {
                push(FieldChange::Contribution {
                    from: row.contribution,
                    to: entry.contribution,
                });
            }
            if entry.eligible != row.eligible {
                push(FieldChange::Eligibility {
                    from: row.eligible,
                    to: entry.eligible,
                });
            }
        }

        Self {
            period: actual.period.label,
            changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn heading(&self) -> String {
        format!(
            "Changes needed to achieve hypothetical scenario for {}:",
            self.period
        )
    }

    /// One line per change, or a single "no differences" line.
    pub fn lines(&self) -> Vec<String> {
        self.lines_redacted(false)
    }

    /// Like [`lines`](Self::lines), masking names when `privacy` is on.
    pub fn lines_redacted(
        &self,
        privacy: bool,
    ) -> Vec<String> {
        if self.changes.is_empty() {
            return vec![format!(
                "No differences between actual and hypothetical scenarios for {}.",
                self.period
            )];
        }
        self.changes.iter().map(|c| c.render(privacy)).collect()
    }

    /// The heading followed by the change lines, or just the "no
    /// differences" line.
    pub fn render(
        &self,
        privacy: bool,
    ) -> String {
        let lines = self.lines_redacted(privacy);
        if self.changes.is_empty() {
            lines.join("\n")
        } else {
            format!("{}\n{}", self.heading(), lines.join("\n"))
        }
    }
}

/// Actual rows, hypothetical rows and the diff between them for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub actual: PeriodSummary,
    /// Overlay values for employees still present in `actual`, by id.
    pub hypothetical: Vec<SummaryRow>,
    pub diff: ScenarioDiff,
}

impl ScenarioReport {
    pub fn build(
        actual: PeriodSummary,
        overlay: &HypotheticalOverlay,
    ) -> Self {
        let diff = ScenarioDiff::compute(&actual, overlay);

        let hypothetical = overlay
            .iter()
            .filter_map(|(employee_id, entry)| {
                actual.row(employee_id).map(|row| SummaryRow {
                    employee_id,
                    name: row.name.clone(),
                    department: row.department,
                    total_income: entry.income,
                    contribution: entry.contribution,
                    eligible: entry.eligible,
                })
            })
            .collect();

        Self {
            actual,
            hypothetical,
            diff,
        }
    }
}
