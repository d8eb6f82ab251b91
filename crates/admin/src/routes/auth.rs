//! Authentication route handlers.
//!
//! Password login with optional "remember me", and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use bitversity_core::{Flash, FlashSeverity};

use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::auth::apply_lifecycle;
use crate::middleware::{load_admin_session, remember_cookie, save_admin_session};
use crate::services::auth::guard::{LOGIN_PATH, is_expired};
use crate::services::auth::{
    AdminAuthError, AdminAuthService, AuthContext, AuthGuard, ClientInfo, TeardownReason,
};
use crate::state::AppState;

const LOGIN_FAILED: &str = "Invalid email or password.";
const DASHBOARD_PATH: &str = "/admin";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present only when ticked.
    pub remember_me: Option<String>,
    #[serde(default)]
    pub csrf_token: String,
}

/// Form carrying only the anti-forgery token.
#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub csrf_token: String,
    pub flash: Option<Flash>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page, or go straight to the dashboard when signed in.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut ctx = AuthContext::new(
        load_admin_session(&session).await?,
        None,
        ClientInfo::from_headers(&headers),
    );

    let store = state.auth_store();
    let guard = AuthGuard::new(&store, &state.config().session_secret);
    if guard.is_authenticated(&mut ctx).await && !is_expired(&ctx.session, Utc::now()) {
        save_admin_session(&session, &ctx.session).await?;
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let mut admin = ctx.session;
    let template = LoginTemplate {
        csrf_token: admin.csrf_token().to_string(),
        flash: admin.pop_flash(),
    };
    save_admin_session(&session, &admin).await?;

    Ok(template.into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut admin = load_admin_session(&session).await?;
    if !admin.validate_csrf(&form.csrf_token) {
        warn!("Login rejected: CSRF token mismatch");
        return Err(AppError::invalid_csrf());
    }

    let config = state.config();
    let service = AdminAuthService::new(state.pool(), &config.session_secret);

    let user = match service
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AdminAuthError::InvalidCredentials) {
                info!("Admin login failed");
            } else {
                error!(error = %e, "Admin login errored");
            }
            admin.set_flash(LOGIN_FAILED, FlashSeverity::Error);
            save_admin_session(&session, &admin).await?;
            return Ok(Redirect::to(LOGIN_PATH).into_response());
        }
    };

    let now = Utc::now();
    session.cycle_id().await?;
    admin.sign_in(user.id, user.email.to_string(), user.display_name(), now);
    service
        .record_login(&user, &ClientInfo::from_headers(&headers), now)
        .await;

    let mut response = Redirect::to(DASHBOARD_PATH).into_response();

    if form.remember_me.is_some() {
        match service
            .issue_remember_token(user.id, config.remember_lifetime(), now)
            .await
        {
            Ok(value) => {
                if let Some(cookie) = remember_cookie::issue(&value, config.remember_days) {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                }
            }
            // Signing in still succeeds; only the long-lived cookie is lost
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to issue remember token"),
        }
    }

    save_admin_session(&session, &admin).await?;
    info!(user_id = %user.id, "Admin signed in");

    Ok(response)
}

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CsrfForm>,
) -> Result<Response, AppError> {
    let admin = load_admin_session(&session).await?;
    if !admin.validate_csrf(&form.csrf_token) {
        warn!("Logout rejected: CSRF token mismatch");
        return Err(AppError::invalid_csrf());
    }

    let mut ctx = AuthContext::new(
        admin,
        remember_cookie::read(&headers),
        ClientInfo::from_headers(&headers),
    );

    let store = state.auth_store();
    AuthGuard::new(&store, &state.config().session_secret)
        .destroy_session(&mut ctx, TeardownReason::Logout, Utc::now())
        .await;

    ctx.session
        .set_flash("You have been signed out.", FlashSeverity::Success);
    apply_lifecycle(&session, &ctx).await?;
    clear_sentry_user();

    let mut response = Redirect::to(LOGIN_PATH).into_response();
    if let Some(cookie) = remember_cookie::clear() {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}
