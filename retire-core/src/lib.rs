pub mod calculations;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod period;
pub mod scenario;

pub use db::repository::{RepositoryError, RetirementRepository};
pub use error::{DateRangeError, EngineError};
pub use models::*;
