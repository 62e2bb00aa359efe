//! # Chat Handler Utilities
//!
//! Shared helper functions for chat handlers.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use lib_auth::decode_jwt;
use lib_core::{AppError, Config};

/// Resolve the merchant behind a request from its bearer token.
///
/// The `Authorization: Bearer <jwt>` header wins; `query_token` covers browser WebSocket
/// clients, which cannot set headers.
pub fn extract_merchant_id(
    headers: &HeaderMap,
    query_token: Option<&str>,
    config: &Config,
) -> Result<String, AppError> {
    let header_token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = header_token
        .or(query_token)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing merchant token".to_string()))?;

    let claims = decode_jwt(token, &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    claims
        .merchant_id()
        .map(str::to_string)
        .map_err(|_| AppError::Unauthorized("Token has no merchant".to_string()))
}
