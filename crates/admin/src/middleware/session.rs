//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! stricter security settings (SameSite=Strict, 24hr expiry), plus helpers
//! to load and store the [`AdminSession`] payload.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::error::AppError;
use crate::models::{AdminSession, session_keys};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "bv_admin_session";

/// Session expiry time in seconds (24 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

const SESSION_SCHEMA: &str = "tower_sessions";
const SESSION_TABLE: &str = "admin_session";

/// `PostgreSQL` session store in `tower_sessions.admin_session`.
///
/// The table is created by the migrations, not at startup.
///
/// # Errors
///
/// Returns `AppError::Internal` if the schema or table name is rejected.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, AppError> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .and_then(|store| store.with_table_name(SESSION_TABLE))
        .map_err(|e| AppError::Internal(format!("session store: {e}")))
}

/// Wrap a session store in the admin cookie settings.
///
/// `secure` should be true whenever the panel is served over HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Read the admin payload, or an empty one for a new session.
///
/// # Errors
///
/// Returns `AppError::Session` if the store cannot be read.
pub async fn load_admin_session(session: &Session) -> Result<AdminSession, AppError> {
    Ok(session
        .get::<AdminSession>(session_keys::ADMIN)
        .await?
        .unwrap_or_default())
}

/// Write the admin payload back. Persisted when the response is sent.
///
/// # Errors
///
/// Returns `AppError::Session` if the payload cannot be serialized.
pub async fn save_admin_session(session: &Session, admin: &AdminSession) -> Result<(), AppError> {
    session.insert(session_keys::ADMIN, admin).await?;
    Ok(())
}
