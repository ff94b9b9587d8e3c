use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    AttendanceRecord, Employee, FiscalSettings, IncomeFilter, IncomeRecord, NewAttendanceRecord,
    NewEmployee, NewIncomeRecord, NewNote, Note, TaxableProfit,
};
use crate::period::DateWindow;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Keyed reads and writes over the retirement tracker's tables.
///
/// Updates and deletes of a missing id return [`RepositoryError::NotFound`].
#[async_trait]
pub trait RetirementRepository: Send + Sync {
    // Employees
    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError>;
    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, RepositoryError>;
    /// Every employee, ascending id.
    async fn list_employees(&self) -> Result<Vec<Employee>, RepositoryError>;
    async fn set_employee_eligibility(
        &self,
        id: i64,
        eligible: bool,
    ) -> Result<(), RepositoryError>;
    /// Removes the employee together with their income, notes and attendance.
    async fn delete_employee(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Income transactions
    async fn create_income(
        &self,
        record: NewIncomeRecord,
    ) -> Result<IncomeRecord, RepositoryError>;
    /// Inserts every record in one transaction; on error none are stored.
    async fn create_income_batch(
        &self,
        records: &[NewIncomeRecord],
    ) -> Result<Vec<IncomeRecord>, RepositoryError>;
    async fn get_income(
        &self,
        id: i64,
    ) -> Result<IncomeRecord, RepositoryError>;
    async fn update_income(
        &self,
        record: &IncomeRecord,
    ) -> Result<(), RepositoryError>;
    async fn delete_income(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    /// Matching records ordered by date, then id.
    async fn list_income(
        &self,
        filter: IncomeFilter,
    ) -> Result<Vec<IncomeRecord>, RepositoryError>;

    // Notes
    async fn create_note(
        &self,
        note: NewNote,
    ) -> Result<Note, RepositoryError>;
    async fn update_note(
        &self,
        note: &Note,
    ) -> Result<(), RepositoryError>;
    async fn delete_note(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    /// Newest first.
    async fn list_notes(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Note>, RepositoryError>;

    // Attendance
    async fn create_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError>;
    async fn update_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<(), RepositoryError>;
    async fn delete_attendance(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    async fn list_attendance(
        &self,
        employee_id: i64,
        window: Option<DateWindow>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;

    // Settings
    async fn get_settings(&self) -> Result<FiscalSettings, RepositoryError>;
    async fn update_settings(
        &self,
        settings: &FiscalSettings,
    ) -> Result<(), RepositoryError>;

    // Taxable profit
    /// Zero when nothing is recorded for `year`.
    async fn get_taxable_profit(
        &self,
        year: i32,
    ) -> Result<Decimal, RepositoryError>;
    async fn set_taxable_profit(
        &self,
        profit: &TaxableProfit,
    ) -> Result<(), RepositoryError>;
}
