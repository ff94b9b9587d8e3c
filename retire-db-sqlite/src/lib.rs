//! SQLite storage for the retirement tracker.

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::{SqliteRepositoryFactory, connection_url};
pub use repository::SqliteRepository;
