//! Single-year income statement.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Revenue |
//! | 2    | Cost of sales |
//! | 3    | Gross profit: Line 1 − Line 2 |
//! | 4    | Administrative expenses |
//! | 5    | Other operating expenses |
//! | 6    | Operating profit: Line 3 − Line 4 − Line 5 |
//! | 7    | Finance costs |
//! | 8    | Other income |
//! | 9    | Profit before tax: Line 6 − Line 7 + Line 8 |
//! | 10   | Tax |
//! | 11   | Profit after tax: Line 9 − Line 10 |
//!
//! Line 9 is the figure recorded as a year's taxable profit.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use retire_core::calculations::{IncomeStatement, IncomeStatementInput};
//!
//! let statement = IncomeStatement::calculate(&IncomeStatementInput {
//!     revenue: dec!(1000),
//!     cost_of_sales: dec!(400),
//!     admin_expenses: dec!(100),
//!     other_operating_expenses: dec!(100),
//!     finance_costs: dec!(50),
//!     other_income: dec!(25),
//!     tax: dec!(75),
//! })
//! .unwrap();
//!
//! assert_eq!(statement.profit_before_tax, dec!(375));
//! assert_eq!(statement.profit_after_tax, dec!(300));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::percent_of;
use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementInput {
    pub revenue: Decimal,
    pub cost_of_sales: Decimal,
    pub admin_expenses: Decimal,
    pub other_operating_expenses: Decimal,
    pub finance_costs: Decimal,
    pub other_income: Decimal,
    pub tax: Decimal,
}

/// One line of the statement's commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementInsight {
    /// Gross profit as a percentage of revenue.
    GrossMargin(Decimal),
    /// Admin plus other operating expenses as a percentage of revenue.
    OperatingExpenseRatio(Decimal),
    /// Tax as a percentage of profit before tax.
    EffectiveTaxRate(Decimal),
    LossBeforeTax,
    LossAfterTax,
}

impl fmt::Display for StatementInsight {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::GrossMargin(pct) => write!(f, "Gross Profit Margin: {pct:.2}%"),
            Self::OperatingExpenseRatio(pct) => {
                write!(f, "Operating Expenses to Revenue: {pct:.2}%")
            }
            Self::EffectiveTaxRate(pct) => write!(f, "Effective Tax Rate: {pct:.2}%"),
            Self::LossBeforeTax => f.write_str("The company is reporting a loss before tax."),
            Self::LossAfterTax => f.write_str("The company is loss-making after tax."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub gross_profit: Decimal,
    pub operating_profit: Decimal,
    pub profit_before_tax: Decimal,
    pub profit_after_tax: Decimal,
    pub insights: Vec<StatementInsight>,
}

impl IncomeStatement {
    /// # Errors
    ///
    /// [`EngineError::InvalidValue`] when a line does not fit in a `Decimal`.
    pub fn calculate(input: &IncomeStatementInput) -> Result<Self, EngineError> {
        let gross_profit = line(input.revenue.checked_sub(input.cost_of_sales), "gross profit")?;
        let opex = line(
            input.admin_expenses.checked_add(input.other_operating_expenses),
            "operating expenses",
        )?;
        let operating_profit = line(gross_profit.checked_sub(opex), "operating profit")?;
        let profit_before_tax = line(
            operating_profit
                .checked_sub(input.finance_costs)
                .and_then(|profit| profit.checked_add(input.other_income)),
            "profit before tax",
        )?;
        let profit_after_tax = line(profit_before_tax.checked_sub(input.tax), "profit after tax")?;

        let mut insights = Vec::new();

        if input.revenue > Decimal::ZERO {
            insights.extend(percent_of(gross_profit, input.revenue).map(StatementInsight::GrossMargin));
            insights.extend(percent_of(opex, input.revenue).map(StatementInsight::OperatingExpenseRatio));
        }

        if profit_before_tax > Decimal::ZERO {
            insights.extend(
                percent_of(input.tax, profit_before_tax).map(StatementInsight::EffectiveTaxRate),
            );
        } else {
            insights.push(StatementInsight::LossBeforeTax);
        }

        if profit_after_tax < Decimal::ZERO {
            insights.push(StatementInsight::LossAfterTax);
        }

        Ok(Self {
            gross_profit,
            operating_profit,
            profit_before_tax,
            profit_after_tax,
            insights,
        })
    }

    pub fn analysis_lines(&self) -> Vec<String> {
        self.insights.iter().map(ToString::to_string).collect()
    }
}

fn line(
    value: Option<Decimal>,
    name: &str,
) -> Result<Decimal, EngineError> {
    value.ok_or_else(|| EngineError::out_of_range(name))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn profitable() -> IncomeStatementInput {
        IncomeStatementInput {
            revenue: dec!(1000),
            cost_of_sales: dec!(400),
            admin_expenses: dec!(100),
            other_operating_expenses: dec!(100),
            finance_costs: dec!(50),
            other_income: dec!(25),
            tax: dec!(75),
        }
    }

    #[test]
    fn profitable_year_lines() {
        let statement = IncomeStatement::calculate(&profitable()).unwrap();

        assert_eq!(statement.gross_profit, dec!(600));
        assert_eq!(statement.operating_profit, dec!(400));
        assert_eq!(statement.profit_before_tax, dec!(375));
        assert_eq!(statement.profit_after_tax, dec!(300));
    }

    #[test]
    fn profitable_year_analysis() {
        let statement = IncomeStatement::calculate(&profitable()).unwrap();

        assert_eq!(
            statement.analysis_lines(),
            vec![
                "Gross Profit Margin: 60.00%".to_string(),
                "Operating Expenses to Revenue: 20.00%".to_string(),
                "Effective Tax Rate: 20.00%".to_string(),
            ]
        );
    }

    #[test]
    fn zero_revenue_skips_ratios_and_reports_loss() {
        let statement = IncomeStatement::calculate(&IncomeStatementInput {
            admin_expenses: dec!(10),
            ..IncomeStatementInput::default()
        })
        .unwrap();

        assert_eq!(
            statement.insights,
            vec![StatementInsight::LossBeforeTax, StatementInsight::LossAfterTax]
        );
    }

    #[test]
    fn break_even_before_tax_counts_as_loss() {
        let statement = IncomeStatement::calculate(&IncomeStatementInput {
            revenue: dec!(500),
            cost_of_sales: dec!(500),
            ..IncomeStatementInput::default()
        })
        .unwrap();

        assert_eq!(statement.profit_before_tax, dec!(0));
        assert!(statement.insights.contains(&StatementInsight::LossBeforeTax));
        assert!(!statement.insights.contains(&StatementInsight::LossAfterTax));
    }

    #[test]
    fn tax_larger_than_profit_is_loss_after_tax() {
        let statement = IncomeStatement::calculate(&IncomeStatementInput {
            tax: dec!(400),
            ..profitable()
        })
        .unwrap();

        assert_eq!(statement.profit_after_tax, dec!(-25));
        assert_eq!(statement.insights.last(), Some(&StatementInsight::LossAfterTax));
    }

    #[test]
    fn out_of_range_line_is_an_error() {
        let result = IncomeStatement::calculate(&IncomeStatementInput {
            revenue: Decimal::MAX,
            other_income: Decimal::MAX,
            ..IncomeStatementInput::default()
        });

        assert!(matches!(result, Err(EngineError::InvalidValue(_))));
    }
}
