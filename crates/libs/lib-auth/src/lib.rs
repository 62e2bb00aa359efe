//! # Authentication Library
//!
//! Merchant bearer tokens (JWT) and customer resume tokens.

pub mod customer_token;
pub mod error;
pub mod token;

// Re-export commonly used types
pub use customer_token::generate_customer_token;
pub use error::AuthError;
pub use token::{Claims, encode_jwt, decode_jwt};
