use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Taxable profit recorded for one year. Years without a record count as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxableProfit {
    pub year: i32,
    pub total_profit: Decimal,
}

impl TaxableProfit {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.total_profit < Decimal::ZERO {
            return Err(EngineError::invalid_value(format!(
                "taxable profit must be non-negative, got {}",
                self.total_profit
            )));
        }
        Ok(())
    }
}
