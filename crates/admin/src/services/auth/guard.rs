//! Request authentication guard for the admin panel.
//!
//! Every guarded request builds an [`AuthContext`] from its session payload,
//! remember cookie and client headers, runs [`AuthGuard::require_auth`], and
//! then applies the directives the guard left on the context (save, renew or
//! destroy the session; clear the remember cookie).
//!
//! The guard decides first and audits afterwards: a failed audit or
//! timestamp write is logged and never changes the outcome.

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use bitversity_core::{ActivityAction, UserId};

use super::store::AuthStore;
use super::token::{RememberCookie, verify_token};
use crate::models::activity::NewActivity;
use crate::models::session::AdminSession;

/// Idle time after which a session no longer authenticates.
pub const INACTIVITY_TIMEOUT_SECS: i64 = 30 * 60;

/// Minimum spacing between `users.last_login` refreshes for one session.
pub const ACTIVITY_WRITE_INTERVAL_SECS: i64 = 5 * 60;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

const UNKNOWN: &str = "Unknown";

/// Client identification recorded in the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            ip_address: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
        }
    }
}

impl ClientInfo {
    /// Read the client IP (first `X-Forwarded-For` hop, then `X-Real-IP`)
    /// and user agent from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header("x-real-ip"))
            .unwrap_or(UNKNOWN)
            .to_string();

        let user_agent = header("user-agent").unwrap_or(UNKNOWN).to_string();

        Self {
            ip_address,
            user_agent,
        }
    }
}

/// What the transport must do with the session record after the guard ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLifecycle {
    /// Save the payload under the current id.
    #[default]
    Unchanged,
    /// Issue a new session id, then save.
    Renewed,
    /// Delete the record; a fresh anonymous session replaces it.
    Destroyed,
}

/// Result of [`AuthGuard::require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    RedirectToLogin,
}

/// Why a session is being torn down; only affects the audit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// The admin clicked "Sign out".
    Logout,
    /// The guard rejected the session (expired, revoked or unverified).
    Rejected,
}

/// Per-request authentication state and output directives.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session: AdminSession,
    /// Raw `remember_admin` cookie value, if the request carried one.
    pub remember_cookie: Option<String>,
    pub client: ClientInfo,
    clear_remember_cookie: bool,
    lifecycle: SessionLifecycle,
}

impl AuthContext {
    #[must_use]
    pub const fn new(
        session: AdminSession,
        remember_cookie: Option<String>,
        client: ClientInfo,
    ) -> Self {
        Self {
            session,
            remember_cookie,
            client,
            clear_remember_cookie: false,
            lifecycle: SessionLifecycle::Unchanged,
        }
    }

    /// The response must expire the remember cookie.
    #[must_use]
    pub const fn clears_remember_cookie(&self) -> bool {
        self.clear_remember_cookie
    }

    #[must_use]
    pub const fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }
}

/// Whether the session has been idle longer than the timeout.
///
/// A session with no activity timestamp is expired.
#[must_use]
pub fn is_expired(session: &AdminSession, now: DateTime<Utc>) -> bool {
    session
        .last_activity
        .is_none_or(|last| now - last > Duration::seconds(INACTIVITY_TIMEOUT_SECS))
}

/// Authentication guard over an [`AuthStore`].
pub struct AuthGuard<'a, S> {
    store: &'a S,
    secret: &'a SecretString,
}

impl<'a, S: AuthStore> AuthGuard<'a, S> {
    /// `secret` is the key remember tokens were hashed with.
    #[must_use]
    pub const fn new(store: &'a S, secret: &'a SecretString) -> Self {
        Self { store, secret }
    }

    /// Whether the session belongs to an active admin.
    ///
    /// A cached role is trusted only once verified in this session. Otherwise
    /// the store is asked, and a confirmed admin role is cached back. Store
    /// errors count as "not authenticated".
    pub async fn is_authenticated(&self, ctx: &mut AuthContext) -> bool {
        let Some(user_id) = ctx.session.user_id else {
            return false;
        };

        if ctx.session.has_verified_admin_role() {
            return true;
        }

        match self.store.admin_status(user_id).await {
            Ok(Some(status)) if status.is_active_admin() => {
                ctx.session.role = Some(status.role);
                ctx.session.role_verified = true;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Admin role lookup failed");
                false
            }
        }
    }

    /// Gate a request.
    ///
    /// Falls back to the remember cookie when the session doesn't
    /// authenticate; if that fails too the session is destroyed. On success
    /// the activity timestamp is refreshed and `last_login` is rewritten at
    /// most every [`ACTIVITY_WRITE_INTERVAL_SECS`].
    pub async fn require_auth(&self, ctx: &mut AuthContext, now: DateTime<Utc>) -> GuardOutcome {
        let authenticated =
            self.is_authenticated(ctx).await && !is_expired(&ctx.session, now);

        if !authenticated {
            let restored = match ctx.remember_cookie.clone() {
                Some(cookie) => self.try_remember_login(ctx, &cookie, now).await,
                None => false,
            };

            if !restored {
                self.destroy_session(ctx, TeardownReason::Rejected, now)
                    .await;
                return GuardOutcome::RedirectToLogin;
            }
        }

        ctx.session.last_activity = Some(now);

        let due = ctx
            .session
            .last_db_activity
            .is_none_or(|last| now - last > Duration::seconds(ACTIVITY_WRITE_INTERVAL_SECS));
        if due {
            if let Some(user_id) = ctx.session.user_id
                && let Err(e) = self.store.touch_last_login(user_id, now).await
            {
                warn!(user_id = %user_id, error = %e, "Failed to refresh last_login");
            }
            ctx.session.last_db_activity = Some(now);
        }

        GuardOutcome::Proceed
    }

    /// Re-establish a session from a remember cookie.
    ///
    /// A malformed cookie is treated as absent. Any other failure marks the
    /// cookie for clearing.
    pub async fn try_remember_login(
        &self,
        ctx: &mut AuthContext,
        cookie_value: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(cookie) = RememberCookie::parse(cookie_value) else {
            debug!("Ignoring malformed remember cookie");
            return false;
        };

        let record = match self.store.latest_remember_token(cookie.user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                ctx.clear_remember_cookie = true;
                return false;
            }
            Err(e) => {
                warn!(user_id = %cookie.user_id, error = %e, "Remember token lookup failed");
                ctx.clear_remember_cookie = true;
                return false;
            }
        };

        let token_matches = verify_token(self.secret, &cookie.token, &record.token_hash);
        if !token_matches || !record.is_usable_at(now) {
            info!(user_id = %cookie.user_id, "Rejected remember token");
            ctx.clear_remember_cookie = true;
            return false;
        }

        ctx.session
            .sign_in(record.user_id, record.email.clone(), record.name.clone(), now);
        ctx.lifecycle = SessionLifecycle::Renewed;

        if let Err(e) = self.store.touch_last_login(record.user_id, now).await {
            warn!(user_id = %record.user_id, error = %e, "Failed to update last_login");
        }
        self.audit(
            ctx,
            record.user_id,
            ActivityAction::AdminAutoLogin,
            format!("{} signed in with a remember-me token", record.email),
        )
        .await;

        info!(user_id = %record.user_id, "Admin session restored from remember token");
        true
    }

    /// Tear down the session.
    ///
    /// Logs the logout, revokes the remember tokens of the user named by the
    /// presented cookie, marks the cookie for clearing and resets the
    /// payload. All writes are best-effort.
    pub async fn destroy_session(
        &self,
        ctx: &mut AuthContext,
        reason: TeardownReason,
        now: DateTime<Utc>,
    ) {
        if let Some(user_id) = ctx.session.user_id {
            let who = ctx.session.email.clone().unwrap_or_else(|| user_id.to_string());
            let description = match reason {
                TeardownReason::Logout => format!("{who} signed out"),
                TeardownReason::Rejected => format!("Session for {who} ended"),
            };
            self.audit(ctx, user_id, ActivityAction::AdminLogout, description)
                .await;

            if let Err(e) = self.store.touch_last_logout(user_id, now).await {
                warn!(user_id = %user_id, error = %e, "Failed to update last_logout");
            }
        }

        if let Some(cookie) = ctx.remember_cookie.as_deref().and_then(RememberCookie::parse)
            && let Err(e) = self.store.delete_remember_tokens(cookie.user_id).await
        {
            warn!(user_id = %cookie.user_id, error = %e, "Failed to delete remember tokens");
        }

        ctx.clear_remember_cookie = true;
        ctx.session.clear();
        ctx.lifecycle = SessionLifecycle::Destroyed;
    }

    async fn audit(
        &self,
        ctx: &AuthContext,
        user_id: UserId,
        action: ActivityAction,
        description: String,
    ) {
        let entry = NewActivity {
            user_id: Some(user_id),
            action,
            description,
            ip_address: ctx.client.ip_address.clone(),
            user_agent: ctx.client.user_agent.clone(),
        };
        if let Err(e) = self.store.record_activity(entry).await {
            warn!(user_id = %user_id, action = %action, error = %e, "Failed to write activity log");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::http::HeaderValue;

    use bitversity_core::{RememberTokenId, UserRole};

    use super::*;
    use crate::db::RepositoryError;
    use crate::db::remember_tokens::RememberTokenRecord;
    use crate::models::user::AdminStatus;
    use crate::services::auth::token::hash_token;

    const SECRET: &str = "k3Y!9vQ#xT2$mW7&pR4*zL8^nB5@hC1%";

    #[derive(Debug, Clone)]
    struct FakeUser {
        email: String,
        role: UserRole,
        is_active: bool,
    }

    /// In-memory identity store that records every write.
    #[derive(Default)]
    struct MemoryAuthStore {
        users: Mutex<HashMap<i32, FakeUser>>,
        tokens: Mutex<HashMap<i32, (String, DateTime<Utc>)>>,
        last_login: Mutex<Vec<(UserId, DateTime<Utc>)>>,
        last_logout: Mutex<Vec<UserId>>,
        deleted_tokens_for: Mutex<Vec<UserId>>,
        activity: Mutex<Vec<NewActivity>>,
        status_lookups: Mutex<u32>,
        fail: bool,
    }

    impl MemoryAuthStore {
        fn with_admin(id: i32) -> Self {
            let store = Self::default();
            store.add_user(id, UserRole::Admin, true);
            store
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn add_user(&self, id: i32, role: UserRole, is_active: bool) {
            self.users.lock().unwrap().insert(
                id,
                FakeUser {
                    email: format!("user{id}@bitversity.com"),
                    role,
                    is_active,
                },
            );
        }

        fn add_token(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) {
            let hash = hash_token(&SecretString::from(SECRET), token).unwrap();
            self.tokens
                .lock()
                .unwrap()
                .insert(user_id, (hash, expires_at));
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::DataCorruption("store offline".to_string()))
            } else {
                Ok(())
            }
        }

        fn actions(&self) -> Vec<ActivityAction> {
            self.activity
                .lock()
                .unwrap()
                .iter()
                .map(|a| a.action)
                .collect()
        }
    }

    impl AuthStore for MemoryAuthStore {
        async fn admin_status(
            &self,
            user_id: UserId,
        ) -> Result<Option<AdminStatus>, RepositoryError> {
            *self.status_lookups.lock().unwrap() += 1;
            self.check()?;
            Ok(self
                .users
                .lock()
                .unwrap()
                .get(&user_id.as_i32())
                .map(|u| AdminStatus {
                    role: u.role,
                    is_active: u.is_active,
                }))
        }

        async fn latest_remember_token(
            &self,
            user_id: UserId,
        ) -> Result<Option<RememberTokenRecord>, RepositoryError> {
            self.check()?;
            let users = self.users.lock().unwrap();
            let tokens = self.tokens.lock().unwrap();
            Ok(tokens.get(&user_id.as_i32()).and_then(|(hash, expires_at)| {
                users.get(&user_id.as_i32()).map(|u| RememberTokenRecord {
                    id: RememberTokenId::new(1),
                    user_id,
                    token_hash: hash.clone(),
                    expires_at: *expires_at,
                    email: u.email.clone(),
                    name: "Test Admin".to_string(),
                    role: u.role,
                    is_active: u.is_active,
                })
            }))
        }

        async fn touch_last_login(
            &self,
            user_id: UserId,
            at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            self.check()?;
            self.last_login.lock().unwrap().push((user_id, at));
            Ok(())
        }

        async fn touch_last_logout(
            &self,
            user_id: UserId,
            _at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            self.check()?;
            self.last_logout.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn delete_remember_tokens(&self, user_id: UserId) -> Result<u64, RepositoryError> {
            self.check()?;
            self.deleted_tokens_for.lock().unwrap().push(user_id);
            Ok(u64::from(
                self.tokens
                    .lock()
                    .unwrap()
                    .remove(&user_id.as_i32())
                    .is_some(),
            ))
        }

        async fn record_activity(&self, entry: NewActivity) -> Result<(), RepositoryError> {
            self.check()?;
            self.activity.lock().unwrap().push(entry);
            Ok(())
        }
    }

    fn secret() -> SecretString {
        SecretString::from(SECRET)
    }

    fn signed_in_session(user_id: i32, now: DateTime<Utc>) -> AdminSession {
        let mut session = AdminSession::default();
        session.sign_in(
            UserId::new(user_id),
            format!("user{user_id}@bitversity.com"),
            "Test Admin".to_string(),
            now,
        );
        session
    }

    fn context(session: AdminSession, cookie: Option<&str>) -> AuthContext {
        AuthContext::new(session, cookie.map(String::from), ClientInfo::default())
    }

    // =========================================================================
    // is_expired
    // =========================================================================

    #[test]
    fn test_missing_activity_timestamp_is_expired() {
        assert!(is_expired(&AdminSession::default(), Utc::now()));
    }

    #[test]
    fn test_expiry_is_strictly_greater_than_timeout() {
        let now = Utc::now();
        let mut session = AdminSession::default();

        session.last_activity = Some(now - Duration::seconds(INACTIVITY_TIMEOUT_SECS));
        assert!(!is_expired(&session, now));

        session.last_activity = Some(now - Duration::seconds(INACTIVITY_TIMEOUT_SECS + 1));
        assert!(is_expired(&session, now));

        session.last_activity = Some(now - Duration::seconds(10));
        assert!(!is_expired(&session, now));
    }

    #[test]
    fn test_fractional_second_past_timeout_is_expired() {
        let now = Utc::now();
        let mut session = AdminSession::default();

        session.last_activity =
            Some(now - Duration::seconds(INACTIVITY_TIMEOUT_SECS) - Duration::milliseconds(900));
        assert!(is_expired(&session, now));
    }

    // =========================================================================
    // is_authenticated
    // =========================================================================

    #[tokio::test]
    async fn test_anonymous_session_is_not_authenticated() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let mut ctx = context(AdminSession::default(), None);

        assert!(!guard.is_authenticated(&mut ctx).await);
        assert_eq!(*store.status_lookups.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_verified_role_skips_store_lookup() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let mut ctx = context(signed_in_session(1, Utc::now()), None);

        assert!(guard.is_authenticated(&mut ctx).await);
        assert_eq!(*store.status_lookups.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unverified_role_is_checked_and_cached() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut session = signed_in_session(1, Utc::now());
        session.role = None;
        session.role_verified = false;
        let mut ctx = context(session, None);

        assert!(guard.is_authenticated(&mut ctx).await);
        assert!(ctx.session.has_verified_admin_role());
        assert!(guard.is_authenticated(&mut ctx).await);
        assert_eq!(*store.status_lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cached_admin_role_without_verification_is_not_trusted() {
        let store = MemoryAuthStore::default();
        store.add_user(1, UserRole::Customer, true);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut session = signed_in_session(1, Utc::now());
        session.role_verified = false;
        let mut ctx = context(session, None);

        assert!(!guard.is_authenticated(&mut ctx).await);
        assert!(!ctx.session.role_verified);
    }

    #[tokio::test]
    async fn test_inactive_admin_is_not_authenticated() {
        let store = MemoryAuthStore::default();
        store.add_user(1, UserRole::Admin, false);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut session = signed_in_session(1, Utc::now());
        session.role_verified = false;
        let mut ctx = context(session, None);

        assert!(!guard.is_authenticated(&mut ctx).await);
    }

    #[tokio::test]
    async fn test_store_error_is_not_authenticated() {
        let store = MemoryAuthStore::failing();
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut session = signed_in_session(1, Utc::now());
        session.role_verified = false;
        let mut ctx = context(session, None);

        assert!(!guard.is_authenticated(&mut ctx).await);
    }

    // =========================================================================
    // require_auth
    // =========================================================================

    #[tokio::test]
    async fn test_active_session_proceeds_and_refreshes_activity() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let start = Utc::now();
        let now = start + Duration::seconds(60);
        let mut ctx = context(signed_in_session(1, start), None);

        assert_eq!(guard.require_auth(&mut ctx, now).await, GuardOutcome::Proceed);
        assert_eq!(ctx.session.last_activity, Some(now));
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Unchanged);
        assert!(!ctx.clears_remember_cookie());
        // Within the write interval: no last_login write
        assert!(store.last_login.lock().unwrap().is_empty());
        assert_eq!(ctx.session.last_db_activity, Some(start));
    }

    #[tokio::test]
    async fn test_last_login_is_throttled_to_write_interval() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let start = Utc::now();
        let mut ctx = context(signed_in_session(1, start), None);

        let first = start + Duration::seconds(ACTIVITY_WRITE_INTERVAL_SECS);
        guard.require_auth(&mut ctx, first).await;
        assert!(store.last_login.lock().unwrap().is_empty());

        let second = start + Duration::seconds(ACTIVITY_WRITE_INTERVAL_SECS + 1);
        guard.require_auth(&mut ctx, second).await;
        assert_eq!(
            *store.last_login.lock().unwrap(),
            vec![(UserId::new(1), second)]
        );
        assert_eq!(ctx.session.last_db_activity, Some(second));
    }

    #[tokio::test]
    async fn test_last_login_write_due_a_fraction_past_interval() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let start = Utc::now();
        let mut ctx = context(signed_in_session(1, start), None);

        let now = start
            + Duration::seconds(ACTIVITY_WRITE_INTERVAL_SECS)
            + Duration::milliseconds(500);
        guard.require_auth(&mut ctx, now).await;
        assert_eq!(*store.last_login.lock().unwrap(), vec![(UserId::new(1), now)]);
    }

    #[tokio::test]
    async fn test_failed_last_login_write_still_advances_marker() {
        let store = MemoryAuthStore::failing();
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let start = Utc::now();
        let now = start + Duration::seconds(600);

        // Verified role and fresh activity: authenticates without the store
        let mut session = signed_in_session(1, start);
        session.last_activity = Some(now - Duration::seconds(5));
        let mut ctx = context(session, None);

        assert_eq!(guard.require_auth(&mut ctx, now).await, GuardOutcome::Proceed);
        assert_eq!(ctx.session.last_db_activity, Some(now));
    }

    #[tokio::test]
    async fn test_idle_session_without_cookie_is_destroyed() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let now = Utc::now();
        let mut ctx = context(signed_in_session(1, now - Duration::minutes(31)), None);

        assert_eq!(
            guard.require_auth(&mut ctx, now).await,
            GuardOutcome::RedirectToLogin
        );
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Destroyed);
        assert_eq!(ctx.session, AdminSession::default());
        assert!(ctx.clears_remember_cookie());
        assert_eq!(store.actions(), vec![ActivityAction::AdminLogout]);
        assert_eq!(*store.last_logout.lock().unwrap(), vec![UserId::new(1)]);
        assert!(!guard.is_authenticated(&mut ctx).await);
    }

    #[tokio::test]
    async fn test_anonymous_request_without_cookie_redirects() {
        let store = MemoryAuthStore::with_admin(1);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let mut ctx = context(AdminSession::default(), None);

        assert_eq!(
            guard.require_auth(&mut ctx, Utc::now()).await,
            GuardOutcome::RedirectToLogin
        );
        // Nobody was signed in: nothing to audit
        assert!(store.actions().is_empty());
        assert!(store.deleted_tokens_for.lock().unwrap().is_empty());
    }

    // =========================================================================
    // Remember-token fallback
    // =========================================================================

    #[tokio::test]
    async fn test_valid_remember_cookie_restores_session() {
        let store = MemoryAuthStore::with_admin(42);
        let now = Utc::now();
        store.add_token(42, "correcttoken", now + Duration::days(30));
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = AuthContext::new(
            AdminSession::default(),
            Some("42:correcttoken".to_string()),
            ClientInfo {
                ip_address: "203.0.113.9".to_string(),
                user_agent: "Firefox".to_string(),
            },
        );

        assert_eq!(guard.require_auth(&mut ctx, now).await, GuardOutcome::Proceed);
        assert_eq!(ctx.session.user_id, Some(UserId::new(42)));
        assert_eq!(ctx.session.role, Some(UserRole::Admin));
        assert!(ctx.session.role_verified);
        assert_eq!(ctx.session.last_activity, Some(now));
        assert_eq!(ctx.session.login_time, Some(now));
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Renewed);
        assert!(!ctx.clears_remember_cookie());

        assert_eq!(
            *store.last_login.lock().unwrap(),
            vec![(UserId::new(42), now)]
        );
        let activity = store.activity.lock().unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].action, ActivityAction::AdminAutoLogin);
        assert_eq!(activity[0].ip_address, "203.0.113.9");
        assert_eq!(activity[0].user_agent, "Firefox");
    }

    #[tokio::test]
    async fn test_wrong_token_fails_and_clears_cookie() {
        let store = MemoryAuthStore::with_admin(42);
        let now = Utc::now();
        store.add_token(42, "correcttoken", now + Duration::days(30));
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = context(AdminSession::default(), Some("42:wrongtoken"));
        assert!(!guard.try_remember_login(&mut ctx, "42:wrongtoken", now).await);
        assert!(ctx.clears_remember_cookie());
        assert!(ctx.session.user_id.is_none());

        let mut ctx = context(AdminSession::default(), Some("42:wrongtoken"));
        assert_eq!(
            guard.require_auth(&mut ctx, now).await,
            GuardOutcome::RedirectToLogin
        );
        assert!(ctx.clears_remember_cookie());
        assert!(ctx.session.user_id.is_none());
        assert!(store.last_login.lock().unwrap().is_empty());
        assert!(!store.actions().contains(&ActivityAction::AdminAutoLogin));
    }

    #[tokio::test]
    async fn test_remember_cookie_for_non_admin_or_inactive_never_authenticates() {
        let now = Utc::now();
        let key = secret();

        for (role, active) in [(UserRole::Customer, true), (UserRole::Admin, false)] {
            let store = MemoryAuthStore::default();
            store.add_user(42, role, active);
            store.add_token(42, "correcttoken", now + Duration::days(30));
            let guard = AuthGuard::new(&store, &key);

            let mut ctx = context(AdminSession::default(), Some("42:correcttoken"));
            assert_eq!(
                guard.require_auth(&mut ctx, now).await,
                GuardOutcome::RedirectToLogin
            );
            assert!(ctx.clears_remember_cookie());
            assert!(!guard.is_authenticated(&mut ctx).await);
        }
    }

    #[tokio::test]
    async fn test_expired_remember_token_fails() {
        let store = MemoryAuthStore::with_admin(42);
        let now = Utc::now();
        store.add_token(42, "correcttoken", now - Duration::seconds(1));
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = context(AdminSession::default(), None);
        assert!(!guard.try_remember_login(&mut ctx, "42:correcttoken", now).await);
        assert!(ctx.clears_remember_cookie());
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_treated_as_absent() {
        let store = MemoryAuthStore::with_admin(42);
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = context(AdminSession::default(), None);
        assert!(!guard.try_remember_login(&mut ctx, "not-a-cookie", Utc::now()).await);
        assert!(!ctx.clears_remember_cookie());
    }

    #[tokio::test]
    async fn test_store_error_during_remember_lookup_fails_closed() {
        let store = MemoryAuthStore::failing();
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = context(AdminSession::default(), Some("42:correcttoken"));
        assert_eq!(
            guard.require_auth(&mut ctx, Utc::now()).await,
            GuardOutcome::RedirectToLogin
        );
        assert!(ctx.clears_remember_cookie());
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Destroyed);
    }

    // =========================================================================
    // destroy_session
    // =========================================================================

    #[tokio::test]
    async fn test_destroy_session_revokes_tokens_named_by_cookie() {
        let store = MemoryAuthStore::with_admin(1);
        store.add_user(42, UserRole::Admin, true);
        let now = Utc::now();
        store.add_token(42, "whatever", now + Duration::days(1));
        let key = secret();
        let guard = AuthGuard::new(&store, &key);

        let mut ctx = context(signed_in_session(1, now), Some("42:not-even-valid"));
        let _ = ctx.session.csrf_token();
        guard
            .destroy_session(&mut ctx, TeardownReason::Logout, now)
            .await;

        assert_eq!(
            *store.deleted_tokens_for.lock().unwrap(),
            vec![UserId::new(42)]
        );
        assert!(store.tokens.lock().unwrap().is_empty());
        assert!(ctx.clears_remember_cookie());
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Destroyed);
        assert_eq!(ctx.session, AdminSession::default());
        assert!(!ctx.session.validate_csrf(""));

        let activity = store.activity.lock().unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].user_id, Some(UserId::new(1)));
        assert!(activity[0].description.contains("signed out"));
    }

    #[tokio::test]
    async fn test_destroy_session_tolerates_store_failures() {
        let store = MemoryAuthStore::failing();
        let key = secret();
        let guard = AuthGuard::new(&store, &key);
        let now = Utc::now();

        let mut ctx = context(signed_in_session(1, now), Some("1:token"));
        guard
            .destroy_session(&mut ctx, TeardownReason::Rejected, now)
            .await;

        assert!(ctx.clears_remember_cookie());
        assert!(!guard.is_authenticated(&mut ctx).await);
    }

    // =========================================================================
    // ClientInfo
    // =========================================================================

    #[test]
    fn test_client_info_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let info = ClientInfo::from_headers(&headers);
        assert_eq!(info.ip_address, "198.51.100.7");
        assert_eq!(info.user_agent, "curl/8.0");
    }

    #[test]
    fn test_client_info_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(ClientInfo::from_headers(&headers).ip_address, "10.0.0.2");

        let info = ClientInfo::from_headers(&HeaderMap::new());
        assert_eq!(info, ClientInfo::default());
        assert_eq!(info.ip_address, "Unknown");
        assert_eq!(info.user_agent, "Unknown");
    }
}
