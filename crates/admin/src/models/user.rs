//! User domain types.

use chrono::{DateTime, Utc};

use bitversity_core::{Email, UserId, UserRole};

/// A user account (domain type).
///
/// The password hash is deliberately absent; it is only read by the login
/// path through [`crate::db::UserRepository::get_login_record`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Account role.
    pub role: UserRole,
    /// Disabled accounts cannot sign in or use remember tokens.
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the email address when both name
    /// parts are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, self.email.as_str())
    }

    /// Whether this account may use the admin panel.
    #[must_use]
    pub const fn can_access_admin(&self) -> bool {
        self.is_active && self.role.is_admin()
    }
}

/// Role and active flag, as read by the auth guard's role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminStatus {
    pub role: UserRole,
    pub is_active: bool,
}

impl AdminStatus {
    /// Active admin.
    #[must_use]
    pub const fn is_active_admin(self) -> bool {
        self.is_active && self.role.is_admin()
    }
}

/// Join first and last name, trimming blanks.
#[must_use]
pub fn display_name(first_name: &str, last_name: &str, email: &str) -> String {
    let full = format!("{} {}", first_name.trim(), last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        email.to_string()
    } else {
        full.to_string()
    }
}
