//! Utility module - common helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type
//! - logging setup
//! - validation constants and helpers

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResult};
pub use logger::{init_logger, init_logger_with_file};
