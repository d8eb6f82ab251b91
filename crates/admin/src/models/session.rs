//! Session payload for admin authentication.
//!
//! Everything the guard needs between requests lives in one serialized
//! [`AdminSession`] stored under [`keys::ADMIN`]. Handlers load it, mutate
//! it, and write it back; nothing reads session state ambiently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bitversity_core::{Flash, FlashSeverity, UserId, UserRole, csrf};

/// Per-session admin state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Signed-in user, if any.
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Cached role. Only trusted when `role_verified` is set.
    pub role: Option<UserRole>,
    /// Role was confirmed against the database during this session.
    pub role_verified: bool,
    /// Last guarded request.
    pub last_activity: Option<DateTime<Utc>>,
    /// Last time `users.last_login` was refreshed.
    pub last_db_activity: Option<DateTime<Utc>>,
    pub login_time: Option<DateTime<Utc>>,
    csrf_token: Option<String>,
    flash: Option<Flash>,
}

impl AdminSession {
    /// Populate the identity of a freshly authenticated admin.
    ///
    /// The role is recorded as verified: callers only get here after the
    /// database said the user is an active admin.
    pub fn sign_in(&mut self, user_id: UserId, email: String, name: String, now: DateTime<Utc>) {
        self.user_id = Some(user_id);
        self.email = Some(email);
        self.name = Some(name);
        self.role = Some(UserRole::Admin);
        self.role_verified = true;
        self.last_activity = Some(now);
        self.last_db_activity = Some(now);
        self.login_time = Some(now);
    }

    /// Cached role is admin and was verified in this session.
    #[must_use]
    pub fn has_verified_admin_role(&self) -> bool {
        self.role_verified && self.role == Some(UserRole::Admin)
    }

    /// Drop every field, including the CSRF token and any pending flash.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Display name for templates.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Admin")
    }

    // =========================================================================
    // CSRF
    // =========================================================================

    /// This session's anti-forgery token, generated on first use.
    pub fn csrf_token(&mut self) -> &str {
        self.csrf_token.get_or_insert_with(csrf::generate_token)
    }

    /// Check a submitted token. Fails when no token was ever generated.
    #[must_use]
    pub fn validate_csrf(&self, candidate: &str) -> bool {
        csrf::validate(self.csrf_token.as_deref(), candidate)
    }

    // =========================================================================
    // Flash
    // =========================================================================

    /// Queue a message for the next rendered page, replacing any pending one.
    pub fn set_flash(&mut self, message: impl Into<String>, severity: FlashSeverity) {
        self.flash = Some(Flash::new(message, severity));
    }

    /// Take the pending message. A second call returns `None`.
    pub fn pop_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for the serialized [`super::AdminSession`].
    pub const ADMIN: &str = "admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_flash_is_destructive() {
        let mut session = AdminSession::default();
        session.set_flash("Saved", FlashSeverity::Success);

        let flash = session.pop_flash().unwrap();
        assert_eq!(flash.message, "Saved");
        assert_eq!(flash.severity, FlashSeverity::Success);
        assert!(session.pop_flash().is_none());
    }

    #[test]
    fn test_set_flash_replaces_pending() {
        let mut session = AdminSession::default();
        session.set_flash("first", FlashSeverity::Info);
        session.set_flash("second", FlashSeverity::Error);
        assert_eq!(session.pop_flash().unwrap().message, "second");
    }

    #[test]
    fn test_csrf_fails_without_token() {
        let session = AdminSession::default();
        assert!(!session.validate_csrf(""));
        assert!(!session.validate_csrf("deadbeef"));
    }

    #[test]
    fn test_csrf_token_is_stable_and_exact() {
        let mut session = AdminSession::default();
        let token = session.csrf_token().to_string();
        assert_eq!(token.len(), csrf::TOKEN_LENGTH);
        assert_eq!(session.csrf_token(), token);

        assert!(session.validate_csrf(&token));
        assert!(!session.validate_csrf(&token[1..]));
        assert!(!session.validate_csrf(&format!("{token}0")));
    }

    #[test]
    fn test_sign_in_marks_role_verified() {
        let now = Utc::now();
        let mut session = AdminSession::default();
        assert!(!session.has_verified_admin_role());

        session.sign_in(UserId::new(7), "ops@bitversity.com".into(), "Ops".into(), now);
        assert!(session.has_verified_admin_role());
        assert_eq!(session.last_activity, Some(now));
        assert_eq!(session.login_time, Some(now));
        assert_eq!(session.display_name(), "Ops");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = AdminSession::default();
        session.sign_in(UserId::new(7), "a@b.co".into(), "A".into(), Utc::now());
        let _ = session.csrf_token();
        session.set_flash("x", FlashSeverity::Info);

        session.clear();
        assert_eq!(session, AdminSession::default());
    }

    #[test]
    fn test_serde_roundtrip_keeps_private_fields() {
        let mut session = AdminSession::default();
        let token = session.csrf_token().to_string();
        session.set_flash("hi", FlashSeverity::Warning);

        let json = serde_json::to_value(&session).unwrap();
        let mut restored: AdminSession = serde_json::from_value(json).unwrap();
        assert!(restored.validate_csrf(&token));
        assert_eq!(restored.pop_flash().unwrap().message, "hi");
    }
}
