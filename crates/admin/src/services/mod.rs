//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password login, remember-me tokens and the request auth guard

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
