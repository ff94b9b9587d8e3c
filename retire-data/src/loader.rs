use std::collections::BTreeSet;
use std::io::Read;

use retire_core::period::parse_display_date;
use retire_core::{IncomeType, NewIncomeRecord, RepositoryError, RetirementRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing income transactions.
///
/// Row numbers count data rows from 1; the header is not counted.
#[derive(Debug, Error)]
pub enum IncomeLoaderError {
    #[error("CSV parse error at row {row}: {message}")]
    CsvParse { row: usize, message: String },

    #[error("Invalid {field} at row {row}: {message}")]
    InvalidField {
        row: usize,
        field: &'static str,
        message: String,
    },

    #[error("Employee {0} not found in database")]
    EmployeeNotFound(i64),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One raw line of an income CSV file.
///
/// Columns are matched by header name:
/// - `employee_id`: id of an existing employee
/// - `amount`: positive amount, e.g. `1500.00`
/// - `date`: `MM-DD-YYYY` or `MMDDYYYY`
/// - `type`: `Salary` or `Bonus` (empty means `Salary`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IncomeCsvRecord {
    pub employee_id: String,
    pub amount: String,
    pub date: String,
    #[serde(rename = "type", default)]
    pub income_type: String,
}

impl IncomeCsvRecord {
    fn into_new_record(
        self,
        row: usize,
    ) -> Result<NewIncomeRecord, IncomeLoaderError> {
        let invalid = |field: &'static str, message: String| IncomeLoaderError::InvalidField {
            row,
            field,
            message,
        };

        let employee_id = self
            .employee_id
            .parse::<i64>()
            .map_err(|e| invalid("employee_id", format!("'{}': {e}", self.employee_id)))?;
        let amount = self
            .amount
            .parse::<Decimal>()
            .map_err(|e| invalid("amount", format!("'{}': {e}", self.amount)))?;
        let date = parse_display_date(&self.date).map_err(|e| invalid("date", e.to_string()))?;
        let income_type = if self.income_type.is_empty() {
            IncomeType::Salary
        } else {
            IncomeType::parse(&self.income_type).ok_or_else(|| {
                invalid(
                    "type",
                    format!("'{}' (expected Salary or Bonus)", self.income_type),
                )
            })?
        };

        let record = NewIncomeRecord {
            employee_id,
            amount,
            date,
            income_type,
        };
        record
            .validate()
            .map_err(|e| invalid("amount", e.to_string()))?;
        Ok(record)
    }
}

/// Imports income transactions from CSV through any [`RetirementRepository`].
pub struct IncomeCsvLoader;

impl IncomeCsvLoader {
    /// Parses and validates every row. Stops at the first bad row.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<NewIncomeRecord>, IncomeLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize::<IncomeCsvRecord>()
            .enumerate()
            .map(|(index, result)| {
                let row = index + 1;
                let raw = result.map_err(|e| IncomeLoaderError::CsvParse {
                    row,
                    message: e.to_string(),
                })?;
                raw.into_new_record(row)
            })
            .collect()
    }

    /// Inserts `records` in one batch, returning how many were written.
    ///
    /// Every referenced employee is checked first, and the batch is written
    /// in a single transaction, so a failed import leaves the database
    /// untouched.
    pub async fn load<R>(
        repo: &R,
        records: &[NewIncomeRecord],
    ) -> Result<usize, IncomeLoaderError>
    where
        R: RetirementRepository + ?Sized,
    {
        let employee_ids: BTreeSet<i64> = records.iter().map(|r| r.employee_id).collect();
        for id in employee_ids {
            repo.get_employee(id).await.map_err(|e| match e {
                RepositoryError::NotFound => IncomeLoaderError::EmployeeNotFound(id),
                other => IncomeLoaderError::Repository(other),
            })?;
        }

        let inserted = repo.create_income_batch(records).await?.len();

        debug!(inserted, "loaded income records");
        Ok(inserted)
    }
}
