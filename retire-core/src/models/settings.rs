use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::period::DateWindow;

/// Earliest and latest fiscal years accepted by the settings form.
pub const MIN_FISCAL_YEAR: i32 = 1900;
pub const MAX_FISCAL_YEAR: i32 = 2100;

/// 5.0%
pub const DEFAULT_PERCENTAGE: Decimal = Decimal::from_parts(50, 0, 0, false, 1);

/// Process-wide fiscal settings (a single stored row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalSettings {
    /// Employer contribution as a percentage of income (5.0 means 5%).
    pub contribution_percentage: Decimal,
    pub selected_year: i32,
    /// When set, read-facing views mask employee names.
    pub privacy_mode: bool,
}

impl FiscalSettings {
    /// Default settings for a fresh database: 5% contribution, privacy off.
    pub fn with_year(selected_year: i32) -> Self {
        Self {
            contribution_percentage: DEFAULT_PERCENTAGE,
            selected_year,
            privacy_mode: false,
        }
    }

    /// Rejects a negative percentage or a year outside
    /// [`MIN_FISCAL_YEAR`]..=[`MAX_FISCAL_YEAR`].
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.contribution_percentage < Decimal::ZERO {
            return Err(EngineError::invalid_value(format!(
                "contribution percentage must be non-negative, got {}",
                self.contribution_percentage
            )));
        }
        if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&self.selected_year) {
            return Err(EngineError::invalid_value(format!(
                "fiscal year must be between {MIN_FISCAL_YEAR} and {MAX_FISCAL_YEAR}, got {}",
                self.selected_year
            )));
        }
        Ok(())
    }

    /// The fiscal window for the selected year.
    pub fn fiscal_window(&self) -> Result<DateWindow, EngineError> {
        DateWindow::fiscal_year(self.selected_year)
    }

    /// True when switching to `other` invalidates values seeded under `self`.
    pub fn changes_scenario_basis(
        &self,
        other: &FiscalSettings,
    ) -> bool {
        self.contribution_percentage != other.contribution_percentage
            || self.selected_year != other.selected_year
    }
}
