//! # Authentication Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to encode JWT: {0}")]
    Encode(String),

    #[error("Failed to decode JWT: {0}")]
    Decode(String),

    #[error("Token has no merchant subject")]
    MissingSubject,
}
