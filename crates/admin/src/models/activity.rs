//! Audit log entries.

use chrono::{DateTime, Utc};

use bitversity_core::{ActivityAction, ActivityLogId, UserId};

/// A new audit record, before insertion.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<UserId>,
    pub action: ActivityAction,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// A stored audit record joined with the acting user's email.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: ActivityLogId,
    pub user_id: Option<UserId>,
    /// `None` when the user was deleted.
    pub user_email: Option<String>,
    /// Stored as text; older rows may carry values this build doesn't know.
    pub action_type: String,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Who performed the action, for display.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.user_email.as_deref().unwrap_or("system")
    }
}
