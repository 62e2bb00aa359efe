//! # JWT Token Management
//!
//! Merchant dashboard tokens. The dashboard login flow lives elsewhere; this crate
//! only mints tokens (tooling, tests) and verifies them on every chat connection.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// JWT Claims structure identifying an authenticated merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (merchant ID)
    pub sub: String,
    /// Merchant display name
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Merchant this token was issued for.
    pub fn merchant_id(&self) -> Result<&str, AuthError> {
        let sub = self.sub.trim();
        if sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(sub)
    }
}

/// Encode a JWT token for a merchant.
pub fn encode_jwt(
    merchant_id: &str,
    name: String,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: merchant_id.to_string(),
        name,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encode(e.to_string()))
}

/// Decode and validate a JWT token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::Decode(e.to_string()))?;

    Ok(token_data.claims)
}
