//! Optional TOML configuration.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "retirement.db"
//!
//! [logging]
//! level = "debug"
//! file = "retire-tracker.log"
//! console = true
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::{Path, PathBuf};

use retire_core::db::DbConfig;
use serde::Deserialize;

use crate::cli::GlobalArgs;
use crate::error::AppError;

pub const DEFAULT_BACKEND: &str = "sqlite";
pub const DEFAULT_DATABASE: &str = "retirement.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            connection_string: DEFAULT_DATABASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive. When unset, `RUST_LOG` applies, then `info`.
    pub level: Option<String>,
    pub file: Option<PathBuf>,
    /// Log to stderr.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            file: None,
            console: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read '{}': {e}", path.display())))?;
        Self::from_toml(&text)
            .map_err(|e| AppError::Config(format!("'{}': {e}", path.display())))
    }

    /// Reads `--config` when given, otherwise starts from defaults, then
    /// applies the remaining flags.
    pub fn resolve(args: &GlobalArgs) -> Result<Self, AppError> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(args))
    }

    pub fn with_overrides(
        mut self,
        args: &GlobalArgs,
    ) -> Self {
        if let Some(backend) = &args.backend {
            self.database.backend = backend.clone();
        }
        if let Some(db) = &args.db {
            self.database.connection_string = db.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(file) = &args.log_file {
            self.logging.file = Some(file.clone());
        }
        if args.quiet {
            self.logging.console = false;
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.to_lowercase(),
            connection_string: self.database.connection_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::default();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, "retirement.db");
        assert_eq!(config.logging.level, None);
        assert!(config.logging.console);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml("[logging]\nlevel = \"debug\"\n").unwrap();

        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn full_file() {
        let text = r#"
            [database]
            backend = "SQLite"
            connection_string = ":memory:"

            [logging]
            file = "tracker.log"
            console = false
        "#;

        let config = AppConfig::from_toml(text).unwrap();

        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: ":memory:".to_string(),
            }
        );
        assert_eq!(config.logging.file, Some(PathBuf::from("tracker.log")));
        assert!(!config.logging.console);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = AppConfig::from_toml("[database]\npath = \"x.db\"\n");

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn flags_override_file() {
        let config = AppConfig::from_toml("[database]\nconnection_string = \"file.db\"\n").unwrap();
        let args = GlobalArgs {
            db: Some("flag.db".to_string()),
            log_level: Some("warn".to_string()),
            quiet: true,
            ..GlobalArgs::default()
        };

        let config = config.with_overrides(&args);

        assert_eq!(config.database.connection_string, "flag.db");
        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert!(!config.logging.console);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let args = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/retire-tracker.toml")),
            ..GlobalArgs::default()
        };

        assert!(matches!(AppConfig::resolve(&args), Err(AppError::Config(_))));
    }
}
