//! Anti-forgery token helpers.
//!
//! A token is generated once per session and compared in constant time on
//! every state-changing form submission. Session payloads own the storage;
//! this module only produces and compares values.

use rand::RngCore;

/// Random bytes per token (hex-encoded to 64 characters).
pub const TOKEN_BYTES: usize = 32;

/// Length of an encoded token.
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Name of the hidden form field carrying the token.
pub const FORM_FIELD: &str = "csrf_token";

/// Generate a new random token from the OS-seeded thread RNG.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compare a submitted token with the session's token.
///
/// Fails when the session has no token yet.
#[must_use]
pub fn validate(expected: Option<&str>, candidate: &str) -> bool {
    expected.is_some_and(|expected| constant_time_eq(expected, candidate))
}

/// Constant-time string comparison to prevent timing attacks.
///
/// Length is not secret: tokens have a fixed length.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_validate_without_session_token_fails() {
        assert!(!validate(None, ""));
        assert!(!validate(None, "anything"));
    }

    #[test]
    fn test_validate_exact_match_only() {
        let token = generate_token();
        assert!(validate(Some(&token), &token));
        assert!(!validate(Some(&token), &token.to_uppercase()));
        assert!(!validate(Some(&token), &token[..TOKEN_LENGTH - 1]));
        assert!(!validate(Some(&token), ""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("hello", "hello"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("hello", "world"));
        assert!(!constant_time_eq("hello", "helloo"));
    }
}
