//! Admin authentication service.
//!
//! Password sign-in, remember-me token issuance and the request guard.
//! Only active accounts with the `admin` role can sign in.

mod error;
pub mod guard;
pub mod store;
pub mod token;

pub use error::AdminAuthError;
pub use guard::{
    AuthContext, AuthGuard, ClientInfo, GuardOutcome, SessionLifecycle, TeardownReason,
};
pub use store::{AuthStore, PgAuthStore};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use sqlx::PgPool;
use tracing::{info, warn};

use bitversity_core::{ActivityAction, Email, UserId};

use crate::db::{ActivityLogRepository, RememberTokenRepository, UserRepository};
use crate::models::activity::NewActivity;
use crate::models::user::User;

/// Minimum password length for admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
    tokens: RememberTokenRepository<'a>,
    activity: ActivityLogRepository<'a>,
    secret: &'a SecretString,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    ///
    /// `secret` keys the remember-token HMAC.
    #[must_use]
    pub const fn new(pool: &'a PgPool, secret: &'a SecretString) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: RememberTokenRepository::new(pool),
            activity: ActivityLogRepository::new(pool),
            secret,
        }
    }

    /// Check an email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for a malformed or unknown
    /// email, a wrong password, a non-admin role or a disabled account.
    /// Returns `AdminAuthError::Repository` if the lookup fails.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_login_record(&email).await? else {
            info!(email = %email, "Admin login for unknown email");
            return Err(AdminAuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        if !user.can_access_admin() {
            warn!(user_id = %user.id, "Admin login refused for non-admin or inactive account");
            return Err(AdminAuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Replace the user's remember tokens with a fresh one.
    ///
    /// Returns the cookie value (`<user_id>:<token>`); only the HMAC of the
    /// token is stored.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::TokenKey` if the signing key is unusable.
    /// Returns `AdminAuthError::Repository` if the tokens cannot be written.
    pub async fn issue_remember_token(
        &self,
        user_id: UserId,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AdminAuthError> {
        let cookie = token::RememberCookie {
            user_id,
            token: token::generate_token(),
        };
        let hash =
            token::hash_token(self.secret, &cookie.token).map_err(|_| AdminAuthError::TokenKey)?;

        self.tokens.delete_for_user(user_id).await?;
        self.tokens.create(user_id, &hash, now + lifetime).await?;

        Ok(cookie.encode())
    }

    /// Stamp `last_login` and write the `admin_login` audit entry.
    ///
    /// Failures are logged and swallowed.
    pub async fn record_login(&self, user: &User, client: &ClientInfo, now: DateTime<Utc>) {
        if let Err(e) = self.users.touch_last_login(user.id, now).await {
            warn!(user_id = %user.id, error = %e, "Failed to update last_login");
        }

        let entry = NewActivity {
            user_id: Some(user.id),
            action: ActivityAction::AdminLogin,
            description: format!("{} signed in", user.email),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        };
        if let Err(e) = self.activity.record(&entry).await {
            warn!(user_id = %user.id, error = %e, "Failed to write activity log");
        }
    }
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}
