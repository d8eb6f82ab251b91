//! Authentication extractor for admin routes.
//!
//! [`RequireAdminAuth`] runs the auth guard before the handler and applies
//! its directives to the tower-sessions record and the remember cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::debug;

use crate::error::{AppError, set_sentry_user};
use crate::middleware::remember_cookie;
use crate::middleware::session::{load_admin_session, save_admin_session};
use crate::models::AdminSession;
use crate::services::auth::guard::LOGIN_PATH;
use crate::services::auth::{
    AuthContext, AuthGuard, ClientInfo, GuardOutcome, SessionLifecycle,
};
use crate::state::AppState;

/// Extractor that requires an authenticated admin.
///
/// Unauthenticated requests are redirected to the login page. Handlers that
/// change the payload (flash, CSRF token) call [`RequireAdminAuth::save`].
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(auth: RequireAdminAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth {
    pub admin: AdminSession,
    pub session: Session,
}

impl RequireAdminAuth {
    /// Store the (modified) payload back into the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the payload cannot be serialized.
    pub async fn save(&self) -> Result<(), AppError> {
        save_admin_session(&self.session, &self.admin).await
    }
}

/// Rejection of [`RequireAdminAuth`].
pub enum AdminAuthRejection {
    /// Not signed in. Optionally expires the remember cookie.
    RedirectToLogin { clear_remember_cookie: bool },
    /// Session store failure.
    Error(AppError),
}

impl From<AppError> for AdminAuthRejection {
    fn from(err: AppError) -> Self {
        Self::Error(err)
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin {
                clear_remember_cookie,
            } => {
                let mut response = Redirect::to(LOGIN_PATH).into_response();
                if clear_remember_cookie && let Some(value) = remember_cookie::clear() {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                response
            }
            Self::Error(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let mut ctx = AuthContext::new(
            load_admin_session(&session).await?,
            remember_cookie::read(&parts.headers),
            ClientInfo::from_headers(&parts.headers),
        );

        let store = state.auth_store();
        let guard = AuthGuard::new(&store, &state.config().session_secret);
        let outcome = guard.require_auth(&mut ctx, Utc::now()).await;

        apply_lifecycle(&session, &ctx).await?;

        match outcome {
            GuardOutcome::Proceed => {
                if let Some(user_id) = ctx.session.user_id {
                    set_sentry_user(user_id.as_i32(), ctx.session.email.as_deref());
                }
                Ok(Self {
                    admin: ctx.session,
                    session,
                })
            }
            GuardOutcome::RedirectToLogin => {
                debug!(path = %parts.uri.path(), "Redirecting unauthenticated request to login");
                Err(AdminAuthRejection::RedirectToLogin {
                    clear_remember_cookie: ctx.clears_remember_cookie(),
                })
            }
        }
    }
}

/// Carry out the guard's session directive and store the payload.
///
/// A destroyed session is deleted from the store and replaced by a fresh
/// anonymous one carrying the reset payload.
///
/// # Errors
///
/// Returns `AppError::Session` if the store fails.
pub async fn apply_lifecycle(session: &Session, ctx: &AuthContext) -> Result<(), AppError> {
    match ctx.lifecycle() {
        SessionLifecycle::Unchanged => {}
        SessionLifecycle::Renewed => session.cycle_id().await?,
        SessionLifecycle::Destroyed => session.flush().await?,
    }
    save_admin_session(session, &ctx.session).await
}
