//! Pure calculations over employee income: contributions, period summaries
//! and the yearly income statement.

pub mod aggregation;
pub mod common;
pub mod contribution;
pub mod income_statement;

pub use aggregation::{
    EmployeeSnapshot, PeriodSummary, PeriodTotals, SummaryAggregator, SummaryColumn, SummaryRow,
};
pub use contribution::{contribution, implied_income};
pub use income_statement::{IncomeStatement, IncomeStatementInput, StatementInsight};
