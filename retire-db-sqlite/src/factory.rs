use async_trait::async_trait;
use chrono::{Datelike, Local};
use retire_core::db::{DbConfig, RepositoryError, RepositoryFactory, RetirementRepository};
use tracing::info;

use crate::repository::SqliteRepository;

/// Turns a connection string into a sqlx URL. Accepts a bare file path,
/// `:memory:`, or a URL that already starts with `sqlite:`.
pub fn connection_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{trimmed}")
    }
}

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use retire_core::db::RepositoryRegistry;
/// use retire_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database, applies migrations and makes sure a settings row
    /// exists (defaulting the fiscal year to the current calendar year).
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RetirementRepository>, RepositoryError> {
        let url = connection_url(&config.connection_string);

        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.ensure_default_settings(Local::now().year())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(url = %url, "opened sqlite repository");
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use retire_core::db::{DbConfig, RepositoryFactory};

    use super::*;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn connection_url_shapes() {
        assert_eq!(connection_url(":memory:"), "sqlite::memory:");
        assert_eq!(connection_url("retirement.db"), "sqlite:retirement.db");
        assert_eq!(connection_url("sqlite:data/x.db"), "sqlite:data/x.db");
    }

    #[tokio::test]
    async fn in_memory_repository_starts_with_default_settings() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("failed to create in-memory repository");

        let settings = repo.get_settings().await.unwrap();
        assert_eq!(settings.selected_year, Local::now().year());
        assert!(!settings.privacy_mode);
        assert!(repo.list_employees().await.unwrap().is_empty());
    }
}
