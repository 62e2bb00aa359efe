//! # Utilities Library
//!
//! Shared utility functions for base64 encoding, environment variables, time, and validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::b64u_encode;
pub use envs::{get_env, get_env_or, get_env_parse_or};
pub use time::now_utc;
pub use validation::{sanitize_text, validate_email, validate_not_empty};
