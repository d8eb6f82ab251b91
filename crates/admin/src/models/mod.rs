//! Domain models for admin.

pub mod activity;
pub mod order;
pub mod session;
pub mod user;

pub use activity::ActivityEntry;
pub use order::{CustomerSpend, OrderStats, OrderSummary, StatusCount};
pub use session::{AdminSession, keys as session_keys};
pub use user::{AdminStatus, User};
