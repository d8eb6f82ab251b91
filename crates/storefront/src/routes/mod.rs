//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Contact
//! GET  /contact                - Contact form
//! POST /contact                - Submit the form (rate limited)
//!
//! # Content pages
//! GET  /help                   - Help Center
//! GET  /privacy                - Privacy Policy
//! GET  /terms                  - Terms of Service
//! ```

pub mod contact;
pub mod health;
pub mod home;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_sessions::SessionStore;

use crate::middleware::{
    contact_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    let submit = match contact_rate_limiter() {
        Some(limiter) => post(contact::submit).layer(limiter),
        None => {
            tracing::warn!("Contact rate limiter unavailable; serving the form without it");
            post(contact::submit)
        }
    };

    Router::new().route("/contact", get(contact::show).merge(submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(contact_routes())
        .merge(pages::router())
}

/// The full application: routes, static assets, sessions and security headers.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config().is_https());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
