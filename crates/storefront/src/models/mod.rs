//! Domain models for storefront.

pub mod session;

pub use session::{VisitorSession, keys as session_keys};
