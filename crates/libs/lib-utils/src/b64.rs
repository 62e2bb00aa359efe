//! # Base64 Encoding
//!
//! URL-safe base64 used for tokens that travel in query strings and local storage.

use base64::{Engine as _, engine::general_purpose};

/// Encode bytes to base64 URL-safe string (no padding).
pub fn b64u_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b64u_encode_is_url_safe() {
        let encoded = b64u_encode([0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "-__-");
        assert!(!encoded.contains('='));
    }
}
