//! # Customer Resume Tokens
//!
//! Opaque tokens handed to a customer's browser on first join. Presenting the token again
//! re-attaches the browser to its earlier session without asking for name and email.

use lib_utils::b64u_encode;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// Generate a fresh random customer token (43 URL-safe characters).
pub fn generate_customer_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    b64u_encode(bytes)
}
