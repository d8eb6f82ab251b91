//! Remember-me token generation, hashing and cookie encoding.
//!
//! The cookie carries `<user_id>:<token>`. The database only ever sees
//! `hex(HMAC-SHA256(ADMIN_SESSION_SECRET, token))`, so a leaked table can't
//! be replayed as cookies.

use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use bitversity_core::UserId;
use bitversity_core::csrf::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per remember token.
const TOKEN_BYTES: usize = 32;

/// Generate a fresh random token (64 hex characters).
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for storage.
///
/// # Errors
///
/// Returns an error if the key is rejected by the MAC (HMAC accepts keys of
/// any length, so this does not happen in practice).
pub fn hash_token(
    secret: &SecretString,
    token: &str,
) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a presented token against a stored hash in constant time.
#[must_use]
pub fn verify_token(secret: &SecretString, token: &str, stored_hash: &str) -> bool {
    hash_token(secret, token).is_ok_and(|computed| constant_time_eq(&computed, stored_hash))
}

/// Parsed value of the `remember_admin` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberCookie {
    pub user_id: UserId,
    pub token: String,
}

impl RememberCookie {
    /// Parse `<user_id>:<token>`, splitting on the first colon only.
    ///
    /// Returns `None` for a missing colon, a non-numeric or non-positive
    /// user id, or an empty token.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (id, token) = value.split_once(':')?;
        let id: i32 = id.trim().parse().ok()?;
        if id <= 0 || token.is_empty() {
            return None;
        }
        Some(Self {
            user_id: UserId::new(id),
            token: token.to_string(),
        })
    }

    /// Cookie value for this token.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}:{}", self.user_id, self.token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("k3Y!9vQ#xT2$mW7&pR4*zL8^nB5@hC1%")
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_is_deterministic_and_keyed() {
        let a = hash_token(&secret(), "token").unwrap();
        let b = hash_token(&secret(), "token").unwrap();
        let other_key = hash_token(&SecretString::from("another-key"), "token").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, other_key);
        assert_ne!(a, "token");
    }

    #[test]
    fn test_verify_token() {
        let stored = hash_token(&secret(), "correcttoken").unwrap();
        assert!(verify_token(&secret(), "correcttoken", &stored));
        assert!(!verify_token(&secret(), "wrongtoken", &stored));
        assert!(!verify_token(&secret(), "correcttoken", ""));
    }

    #[test]
    fn test_parse_cookie() {
        let cookie = RememberCookie::parse("42:correcttoken").unwrap();
        assert_eq!(cookie.user_id, UserId::new(42));
        assert_eq!(cookie.token, "correcttoken");
        assert_eq!(cookie.encode(), "42:correcttoken");
    }

    #[test]
    fn test_parse_cookie_splits_on_first_colon() {
        let cookie = RememberCookie::parse("7:abc:def").unwrap();
        assert_eq!(cookie.user_id, UserId::new(7));
        assert_eq!(cookie.token, "abc:def");
    }

    #[test]
    fn test_parse_cookie_malformed() {
        assert!(RememberCookie::parse("").is_none());
        assert!(RememberCookie::parse("42").is_none());
        assert!(RememberCookie::parse("42:").is_none());
        assert!(RememberCookie::parse("abc:token").is_none());
        assert!(RememberCookie::parse("0:token").is_none());
        assert!(RememberCookie::parse("-3:token").is_none());
        assert!(RememberCookie::parse(":token").is_none());
    }
}
