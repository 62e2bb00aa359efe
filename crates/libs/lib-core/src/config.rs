//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! # Ok::<(), String>(())
//! ```

use lib_utils::envs::{get_env, get_env_or, get_env_parse_or};
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for verifying merchant dashboard tokens
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// Merchant token validity period in hours (1-720)
    pub jwt_expiration_hours: i64,

    /// Upper bound for a single AI reply, in seconds (1-300)
    ///
    /// A responder that has not answered by then is treated as a failed turn.
    pub ai_timeout_secs: u64,

    /// Number of most recent messages handed to the AI responder as context
    pub ai_context_window: usize,

    /// Maximum message length in characters, after sanitizing
    pub max_message_length: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/storefront_chat.db");

        let jwt_secret = get_env("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set in environment")?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24)
            .map_err(|e| format!("JWT_EXPIRATION_HOURS must be a valid number: {}", e))?;

        let ai_timeout_secs = get_env_parse_or("AI_TIMEOUT_SECS", 20)
            .map_err(|e| format!("AI_TIMEOUT_SECS must be a valid number: {}", e))?;

        let ai_context_window = get_env_parse_or("AI_CONTEXT_WINDOW", 20)
            .map_err(|e| format!("AI_CONTEXT_WINDOW must be a valid number: {}", e))?;

        let max_message_length = get_env_parse_or("MAX_MESSAGE_LENGTH", 2000)
            .map_err(|e| format!("MAX_MESSAGE_LENGTH must be a valid number: {}", e))?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            ai_timeout_secs,
            ai_context_window,
            max_message_length,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.ai_timeout_secs < 1 || self.ai_timeout_secs > 300 {
            return Err("AI_TIMEOUT_SECS must be between 1 and 300".to_string());
        }

        if self.max_message_length == 0 {
            return Err("MAX_MESSAGE_LENGTH must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}
