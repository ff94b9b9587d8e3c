use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use retire_core::period::DateWindow;
use retire_core::{
    AttendanceRecord, AttendanceStatus, Department, Employee, FiscalSettings, IncomeFilter,
    IncomeRecord, IncomeType, NewAttendanceRecord, NewEmployee, NewIncomeRecord, NewNote, Note,
    RepositoryError, RetirementRepository, TaxableProfit,
};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult, SqliteRow};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to a sqlx SQLite URL (`sqlite:retirement.db`,
    /// `sqlite::memory:`). Database files are created when missing.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// opened on a single connection that never expires.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(4)
                .acquire_timeout(Duration::from_secs(10))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {database_url}"))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Inserts the default settings row (5% contribution, privacy off) for
    /// `year` unless a settings row already exists.
    pub async fn ensure_default_settings(
        &self,
        year: i32,
    ) -> Result<()> {
        let defaults = FiscalSettings::with_year(year);
        let result = sqlx::query(
            "INSERT OR IGNORE INTO settings (id, contribution_percentage, selected_year, privacy_mode)
             VALUES (1, ?, ?, ?)",
        )
        .bind(decimal_to_f64(defaults.contribution_percentage))
        .bind(defaults.selected_year)
        .bind(defaults.privacy_mode)
        .execute(&self.pool)
        .await
        .context("Failed to insert default settings")?;

        if result.rows_affected() > 0 {
            info!(year, "initialized default settings");
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(db_error)
}

/// Maps a zero-row write to [`RepositoryError::NotFound`].
fn require_row(result: SqliteQueryResult) -> Result<(), RepositoryError> {
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

fn row_to_employee(row: &SqliteRow) -> Result<Employee, RepositoryError> {
    let department: Option<String> = column(row, "department")?;
    Ok(Employee {
        id: column(row, "id")?,
        name: column(row, "name")?,
        // Unknown labels from older data read as unset.
        department: department.as_deref().and_then(Department::parse),
        eligible: column(row, "eligible")?,
    })
}

fn row_to_income(row: &SqliteRow) -> Result<IncomeRecord, RepositoryError> {
    let income_type: String = column(row, "income_type")?;
    Ok(IncomeRecord {
        id: column(row, "id")?,
        employee_id: column(row, "employee_id")?,
        amount: get_decimal(row, "amount")?,
        date: column(row, "date")?,
        income_type: IncomeType::parse(&income_type).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid income type: {income_type}"))
        })?,
    })
}

fn row_to_note(row: &SqliteRow) -> Result<Note, RepositoryError> {
    Ok(Note {
        id: column(row, "id")?,
        employee_id: column(row, "employee_id")?,
        text: column(row, "note_text")?,
        date: column(row, "date")?,
    })
}

fn row_to_attendance(row: &SqliteRow) -> Result<AttendanceRecord, RepositoryError> {
    let status: String = column(row, "status")?;
    Ok(AttendanceRecord {
        id: column(row, "id")?,
        employee_id: column(row, "employee_id")?,
        date: column(row, "date")?,
        status: AttendanceStatus::parse(&status).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid attendance status: {status}"))
        })?,
    })
}

#[async_trait]
impl RetirementRepository for SqliteRepository {
    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let id = sqlx::query("INSERT INTO employees (name, department, eligible) VALUES (?, ?, ?)")
            .bind(&employee.name)
            .bind(employee.department.map(|d| d.as_str()))
            .bind(employee.eligible)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .last_insert_rowid();

        debug!(id, name = %employee.name, "created employee");
        Ok(Employee {
            id,
            name: employee.name,
            department: employee.department,
            eligible: employee.eligible,
        })
    }

    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query("SELECT id, name, department, eligible FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_employee(&row)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, department, eligible FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_employee).collect()
    }

    async fn set_employee_eligibility(
        &self,
        id: i64,
        eligible: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE employees SET eligible = ? WHERE id = ?")
            .bind(eligible)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn delete_employee(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for table in ["income", "notes", "attendance"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE employee_id = ?"))
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        // Dropping the transaction rolls back the child deletes.
        require_row(result)?;

        tx.commit().await.map_err(db_error)?;
        debug!(id, "deleted employee and dependent records");
        Ok(())
    }

    async fn create_income(
        &self,
        record: NewIncomeRecord,
    ) -> Result<IncomeRecord, RepositoryError> {
        let id = sqlx::query(
            "INSERT INTO income (employee_id, amount, date, income_type) VALUES (?, ?, ?, ?)",
        )
        .bind(record.employee_id)
        .bind(decimal_to_f64(record.amount))
        .bind(record.date)
        .bind(record.income_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?
        .last_insert_rowid();

        Ok(IncomeRecord {
            id,
            employee_id: record.employee_id,
            amount: record.amount,
            date: record.date,
            income_type: record.income_type,
        })
    }

    async fn create_income_batch(
        &self,
        records: &[NewIncomeRecord],
    ) -> Result<Vec<IncomeRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut created = Vec::with_capacity(records.len());

        for record in records {
            let id = sqlx::query(
                "INSERT INTO income (employee_id, amount, date, income_type) VALUES (?, ?, ?, ?)",
            )
            .bind(record.employee_id)
            .bind(decimal_to_f64(record.amount))
            .bind(record.date)
            .bind(record.income_type.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .last_insert_rowid();

            created.push(IncomeRecord {
                id,
                employee_id: record.employee_id,
                amount: record.amount,
                date: record.date,
                income_type: record.income_type,
            });
        }

        tx.commit().await.map_err(db_error)?;
        debug!(inserted = created.len(), "inserted income batch");
        Ok(created)
    }

    async fn get_income(
        &self,
        id: i64,
    ) -> Result<IncomeRecord, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, amount, date, income_type FROM income WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_income(&row)
    }

    async fn update_income(
        &self,
        record: &IncomeRecord,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE income SET amount = ?, date = ?, income_type = ? WHERE id = ?")
                .bind(decimal_to_f64(record.amount))
                .bind(record.date)
                .bind(record.income_type.as_str())
                .bind(record.id)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        require_row(result)
    }

    async fn delete_income(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM income WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn list_income(
        &self,
        filter: IncomeFilter,
    ) -> Result<Vec<IncomeRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, employee_id, amount, date, income_type FROM income
             WHERE (?1 IS NULL OR employee_id = ?1)
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date, id",
        )
        .bind(filter.employee_id)
        .bind(filter.window.map(|w| w.start()))
        .bind(filter.window.map(|w| w.end()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_income).collect()
    }

    async fn create_note(
        &self,
        note: NewNote,
    ) -> Result<Note, RepositoryError> {
        let id = sqlx::query("INSERT INTO notes (employee_id, note_text, date) VALUES (?, ?, ?)")
            .bind(note.employee_id)
            .bind(&note.text)
            .bind(note.date)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .last_insert_rowid();

        Ok(Note {
            id,
            employee_id: note.employee_id,
            text: note.text,
            date: note.date,
        })
    }

    async fn update_note(
        &self,
        note: &Note,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE notes SET note_text = ?, date = ? WHERE id = ?")
            .bind(&note.text)
            .bind(note.date)
            .bind(note.id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn delete_note(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn list_notes(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Note>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, employee_id, note_text, date FROM notes
             WHERE employee_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_note).collect()
    }

    async fn create_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let id = sqlx::query("INSERT INTO attendance (employee_id, date, status) VALUES (?, ?, ?)")
            .bind(record.employee_id)
            .bind(record.date)
            .bind(record.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .last_insert_rowid();

        Ok(AttendanceRecord {
            id,
            employee_id: record.employee_id,
            date: record.date,
            status: record.status,
        })
    }

    async fn update_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE attendance SET date = ?, status = ? WHERE id = ?")
            .bind(record.date)
            .bind(record.status.as_str())
            .bind(record.id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn delete_attendance(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        require_row(result)
    }

    async fn list_attendance(
        &self,
        employee_id: i64,
        window: Option<DateWindow>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, employee_id, date, status FROM attendance
             WHERE employee_id = ?1
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date, id",
        )
        .bind(employee_id)
        .bind(window.map(|w| w.start()))
        .bind(window.map(|w| w.end()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_attendance).collect()
    }

    async fn get_settings(&self) -> Result<FiscalSettings, RepositoryError> {
        let row = sqlx::query(
            "SELECT contribution_percentage, selected_year, privacy_mode FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(FiscalSettings {
            contribution_percentage: get_decimal(&row, "contribution_percentage")?,
            selected_year: column(&row, "selected_year")?,
            privacy_mode: column(&row, "privacy_mode")?,
        })
    }

    async fn update_settings(
        &self,
        settings: &FiscalSettings,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO settings (id, contribution_percentage, selected_year, privacy_mode)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                contribution_percentage = excluded.contribution_percentage,
                selected_year = excluded.selected_year,
                privacy_mode = excluded.privacy_mode",
        )
        .bind(decimal_to_f64(settings.contribution_percentage))
        .bind(settings.selected_year)
        .bind(settings.privacy_mode)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn get_taxable_profit(
        &self,
        year: i32,
    ) -> Result<Decimal, RepositoryError> {
        let row = sqlx::query("SELECT total_profit FROM taxable_income WHERE year = ?")
            .bind(year)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => get_decimal(&row, "total_profit"),
            None => Ok(Decimal::ZERO),
        }
    }

    async fn set_taxable_profit(
        &self,
        profit: &TaxableProfit,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO taxable_income (year, total_profit) VALUES (?, ?)
             ON CONFLICT(year) DO UPDATE SET total_profit = excluded.total_profit",
        )
        .bind(profit.year)
        .bind(decimal_to_f64(profit.total_profit))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}
