//! CSV import of income transactions.

pub mod loader;

pub use loader::{IncomeCsvLoader, IncomeCsvRecord, IncomeLoaderError};
