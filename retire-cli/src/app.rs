use retire_core::RetirementRepository;
use retire_core::db::{DbConfig, RepositoryRegistry};
use retire_db_sqlite::SqliteRepositoryFactory;
use tracing::debug;

use crate::error::AppError;

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(
    config: &DbConfig,
) -> Result<Box<dyn RetirementRepository>, AppError> {
    debug!(backend = %config.backend, "opening repository");
    Ok(build_registry().create(config).await?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sqlite_is_registered() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_is_a_configuration_error() {
        let config = DbConfig {
            backend: "postgres".to_string(),
            connection_string: "retirement".to_string(),
        };

        assert!(matches!(
            open_repository(&config).await,
            Err(AppError::Repository(retire_core::RepositoryError::Configuration(_)))
        ));
    }
}
