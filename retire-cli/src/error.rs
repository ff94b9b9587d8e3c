use retire_core::{EngineError, RepositoryError};
use retire_data::IncomeLoaderError;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Import(#[from] IncomeLoaderError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Turns a bare `NotFound` from the repository into one naming the record.
    pub(crate) fn not_found(
        what: impl Into<String>,
    ) -> impl FnOnce(RepositoryError) -> AppError {
        let what = what.into();
        move |e| match e {
            RepositoryError::NotFound => AppError::NotFound(what),
            other => AppError::Repository(other),
        }
    }
}
