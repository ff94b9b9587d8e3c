pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod session;

pub use config::AppConfig;
pub use error::AppError;
pub use session::{OverlayEdit, Session};
