//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions, plus helpers to
//! load and store the [`VisitorSession`] payload.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::error::AppError;
use crate::models::{VisitorSession, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bv_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

const SESSION_SCHEMA: &str = "tower_sessions";
const SESSION_TABLE: &str = "storefront_session";

/// `PostgreSQL` session store in `tower_sessions.storefront_session`.
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

/// Create the session layer around a store.
///
/// `secure` should be true whenever the site is served over HTTPS.
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
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Read the visitor payload, or an empty one for a new session.
///
/// # Errors
///
/// Returns `AppError::Session` if the store cannot be read.
pub async fn load_visitor(session: &Session) -> Result<VisitorSession, AppError> {
    Ok(session
        .get::<VisitorSession>(session_keys::VISITOR)
        .await?
        .unwrap_or_default())
}

/// Write the visitor payload back.
///
/// # Errors
///
/// Returns `AppError::Session` if the payload cannot be serialized.
pub async fn save_visitor(session: &Session, visitor: &VisitorSession) -> Result<(), AppError> {
    session.insert(session_keys::VISITOR, visitor).await?;
    Ok(())
}
