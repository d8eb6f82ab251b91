//! Bitversity Admin library.
//!
//! The back-office as a library, so the binary, the CLI and the router tests
//! share one implementation.
//!
//! # Security
//!
//! Every `/admin` route sits behind the auth guard
//! ([`middleware::RequireAdminAuth`]): an active account with the `admin`
//! role, idle for no more than 30 minutes, or a valid remember-me cookie.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
