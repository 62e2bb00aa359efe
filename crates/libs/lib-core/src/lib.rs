//! # Core Library
//!
//! Core models, database, configuration, and error types for the chat service.

pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{DbPool, create_pool, MIGRATOR};
