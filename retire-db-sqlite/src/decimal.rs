//! Money columns are stored as REAL. SQLite hands back whole-number values as
//! INTEGER, so reads accept either storage class.

use retire_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

fn column_error(
    column: &str,
    err: impl std::fmt::Display,
) -> RepositoryError {
    RepositoryError::Database(format!("column '{column}': {err}"))
}

/// Reads a money column as a [`Decimal`]. NULL reads as zero.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let raw = row.try_get_raw(column).map_err(|e| column_error(column, e))?;
    if raw.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_name = raw.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(column)
            .map(Decimal::from)
            .map_err(|e| column_error(column, e)),
        "REAL" => {
            let value: f64 = row.try_get(column).map_err(|e| column_error(column, e))?;
            Decimal::try_from(value).map_err(|e| column_error(column, format!("{value}: {e}")))
        }
        other => Err(column_error(column, format!("unexpected type {other}"))),
    }
}

/// Converts a [`Decimal`] for binding to a REAL column.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn pool_with_row(insert: &str) -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        sqlx::query("CREATE TABLE money (amount REAL, label TEXT)")
            .execute(&pool)
            .await
            .expect("Failed to create table");
        sqlx::query(insert)
            .execute(&pool)
            .await
            .expect("Failed to insert row");
        pool
    }

    async fn read(
        pool: &SqlitePool,
        column: &str,
    ) -> Result<Decimal, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {column} FROM money"))
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row");
        get_decimal(&row, column)
    }

    #[tokio::test]
    async fn reads_real_value() {
        let pool = pool_with_row("INSERT INTO money (amount) VALUES (1234.56)").await;

        assert_eq!(read(&pool, "amount").await, Ok(dec!(1234.56)));
    }

    #[tokio::test]
    async fn reads_integer_literal() {
        let pool = pool_with_row("INSERT INTO money (amount) VALUES (40000)").await;

        assert_eq!(read(&pool, "amount").await, Ok(dec!(40000)));
    }

    #[tokio::test]
    async fn null_reads_as_zero() {
        let pool = pool_with_row("INSERT INTO money (amount) VALUES (NULL)").await;

        assert_eq!(read(&pool, "amount").await, Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn text_column_is_rejected() {
        let pool = pool_with_row("INSERT INTO money (label) VALUES ('abc')").await;

        assert!(matches!(
            read(&pool, "label").await,
            Err(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn missing_column_is_rejected() {
        let pool = pool_with_row("INSERT INTO money (amount) VALUES (1)").await;
        let row = sqlx::query("SELECT amount FROM money")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(get_decimal(&row, "nope").is_err());
    }

    #[test]
    fn decimal_to_f64_keeps_cents() {
        assert_eq!(decimal_to_f64(dec!(2000.25)), 2000.25);
    }
}
