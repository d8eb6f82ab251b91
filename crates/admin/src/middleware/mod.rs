//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Security headers (strict CSP, no-store)
//! 6. Rate limiting on the login form (governor)
//!
//! The auth guard runs per handler through the [`RequireAdminAuth`] extractor.

pub mod auth;
pub mod rate_limit;
pub mod remember_cookie;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdminAuth};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, load_admin_session, postgres_store, save_admin_session};
