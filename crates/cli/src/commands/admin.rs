//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! bv-cli admin create -e ops@bitversity.com -f Ada -l Lovelace -p 'correct horse battery'
//!
//! # Disable an account (also revokes its remember-me tokens)
//! bv-cli admin set-active -e ops@bitversity.com --active false
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use bitversity_admin::db::users::NewUser;
use bitversity_admin::db::{RememberTokenRepository, RepositoryError, UserRepository};
use bitversity_admin::services::auth::{hash_password, validate_password};
use bitversity_core::{Email, UserId, UserRole};

use super::{CommandError, connect};

const NAME_MAX: usize = 100;

/// Validated input for a new admin account.
#[derive(Debug)]
pub struct AdminDraft {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl AdminDraft {
    /// Check every argument and hash the password.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for a malformed email, a blank or overlong
    /// name, or a password that breaks the strength rules.
    pub fn new(
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Self, CommandError> {
        let email = Email::parse(email)?;
        let first_name = check_name("first name", first_name)?;
        let last_name = check_name("last name", last_name)?;
        validate_password(password)?;

        Ok(Self {
            email,
            first_name,
            last_name,
            password_hash: hash_password(password)?,
        })
    }
}

fn check_name(field: &'static str, value: &str) -> Result<String, CommandError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::InvalidArgument(field, "cannot be empty".to_string()));
    }
    if value.chars().count() > NAME_MAX {
        return Err(CommandError::InvalidArgument(
            field,
            format!("must be at most {NAME_MAX} characters"),
        ));
    }
    Ok(value.to_string())
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError` if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Result<UserId, CommandError> {
    let draft = AdminDraft::new(email, first_name, last_name, password)?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", draft.email);

    let user = UserRepository::new(&pool)
        .create(&NewUser {
            email: &draft.email,
            first_name: &draft.first_name,
            last_name: &draft.last_name,
            password_hash: &draft.password_hash,
            role: UserRole::Admin,
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}

/// Activate or deactivate an account.
///
/// Deactivating also deletes the account's remember-me tokens so no browser
/// can sign back in with one.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no account has this email.
pub async fn set_active(email: &str, active: bool) -> Result<UserId, CommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user_id = match UserRepository::new(&pool).set_active(&email, active).await {
        Ok(id) => id,
        Err(RepositoryError::NotFound) => {
            return Err(CommandError::UserNotFound(email.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    if active {
        tracing::info!("Activated {} (ID {})", email, user_id);
    } else {
        let revoked = RememberTokenRepository::new(&pool)
            .delete_for_user(user_id)
            .await?;
        tracing::info!(
            "Deactivated {} (ID {}), revoked {} remember token(s)",
            email,
            user_id,
            revoked
        );
    }

    Ok(user_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_normalizes_input() {
        let draft =
            AdminDraft::new(" Ops@Bitversity.com ", " Ada ", "Lovelace", "a-long-passphrase")
                .unwrap();
        assert_eq!(draft.email.as_str(), "ops@bitversity.com");
        assert_eq!(draft.first_name, "Ada");
        assert!(draft.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_draft_rejects_bad_email() {
        assert!(matches!(
            AdminDraft::new("ops", "Ada", "Lovelace", "a-long-passphrase"),
            Err(CommandError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        assert!(matches!(
            AdminDraft::new("ops@bitversity.com", "  ", "Lovelace", "a-long-passphrase"),
            Err(CommandError::InvalidArgument("first name", _))
        ));
        assert!(matches!(
            AdminDraft::new("ops@bitversity.com", "Ada", &"x".repeat(101), "a-long-passphrase"),
            Err(CommandError::InvalidArgument("last name", _))
        ));
    }

    #[test]
    fn test_draft_rejects_short_password() {
        assert!(matches!(
            AdminDraft::new("ops@bitversity.com", "Ada", "Lovelace", "short"),
            Err(CommandError::Auth(_))
        ));
    }
}
