//! Bitversity Core - Shared types library.
//!
//! This crate provides common types used across all Bitversity components:
//! - `storefront` - Public site (contact, help center, legal pages)
//! - `admin` - Back-office (authentication, dashboards, orders, activity log)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, money, roles and statuses
//! - [`flash`] - One-shot session notifications
//! - [`csrf`] - Per-session anti-forgery tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod csrf;
pub mod flash;
pub mod types;

pub use flash::{Flash, FlashSeverity};
pub use types::*;
