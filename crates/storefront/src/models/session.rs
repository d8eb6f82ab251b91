//! Session-related types.
//!
//! The storefront has no sign-in; a visitor's session only carries the
//! anti-forgery token and a pending flash message.

use serde::{Deserialize, Serialize};

use bitversity_core::{Flash, FlashSeverity, csrf};

/// Session-stored visitor state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitorSession {
    #[serde(default)]
    csrf_token: Option<String>,
    #[serde(default)]
    flash: Option<Flash>,
}

impl VisitorSession {
    /// The session's CSRF token, generated on first use.
    pub fn csrf_token(&mut self) -> &str {
        self.csrf_token.get_or_insert_with(csrf::generate_token)
    }

    /// Constant-time check of a submitted token.
    #[must_use]
    pub fn validate_csrf(&self, candidate: &str) -> bool {
        csrf::validate(self.csrf_token.as_deref(), candidate)
    }

    /// Queue a message for the next rendered page, replacing any pending one.
    pub fn set_flash(&mut self, message: impl Into<String>, severity: FlashSeverity) {
        self.flash = Some(Flash::new(message, severity));
    }

    /// Take the pending flash; it is shown once.
    pub fn pop_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }
}

/// Session keys for visitor data.
pub mod keys {
    /// Key for the [`super::VisitorSession`] payload.
    pub const VISITOR: &str = "visitor";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_is_shown_once() {
        let mut session = VisitorSession::default();
        session.set_flash("Thanks!", FlashSeverity::Success);
        let flash = session.pop_flash().unwrap();
        assert_eq!(flash.message, "Thanks!");
        assert_eq!(flash.severity, FlashSeverity::Success);
        assert!(session.pop_flash().is_none());
    }

    #[test]
    fn test_set_flash_replaces_pending() {
        let mut session = VisitorSession::default();
        session.set_flash("first", FlashSeverity::Info);
        session.set_flash("second", FlashSeverity::Error);
        assert_eq!(session.pop_flash().unwrap().message, "second");
    }

    #[test]
    fn test_csrf_requires_issued_token() {
        let mut session = VisitorSession::default();
        assert!(!session.validate_csrf(""));

        let token = session.csrf_token().to_string();
        assert_eq!(token.len(), csrf::TOKEN_LENGTH);
        assert_eq!(session.csrf_token(), token);
        assert!(session.validate_csrf(&token));
        assert!(!session.validate_csrf(&token[1..]));
    }

    #[test]
    fn test_old_payload_without_fields_deserializes() {
        let session: VisitorSession = serde_json::from_str("{}").unwrap();
        assert!(session.flash.is_none());
    }
}
