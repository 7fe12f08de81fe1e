//! Authorization gate evaluated before entering a protected route.
//!
//! The guard runs a four-state check: `Checking` while it evaluates, then
//! exactly one of `Allowed`, `DeniedNotAuthenticated`, or
//! `DeniedNoPermission`. Denied states map to a redirect target; only
//! `Allowed` lets the protected content through. The check runs once per
//! call; re-evaluation is the caller's decision when session fields change.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::context::AccessContext;
use crate::source::ProfileSource;

/// Where a denied guard sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The login view.
    Login,
    /// The dedicated forbidden view.
    Forbidden,
}

/// State of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Evaluation in progress.
    Checking,
    /// No consistent credential/flag pair was present.
    DeniedNotAuthenticated,
    /// A required permission key was not granted.
    DeniedNoPermission,
    /// The protected content may be shown.
    Allowed,
}

impl GuardState {
    /// Returns the redirect target for a denied state.
    #[must_use]
    pub fn redirect(&self) -> Option<RedirectTarget> {
        match self {
            Self::DeniedNotAuthenticated => Some(RedirectTarget::Login),
            Self::DeniedNoPermission => Some(RedirectTarget::Forbidden),
            Self::Checking | Self::Allowed => None,
        }
    }

    /// Returns true if the protected content may be shown.
    #[must_use]
    pub fn allows(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Authorization gate for a protected route.
pub struct RouteGuard {
    context: Arc<AccessContext>,
    required_permission: Option<String>,
    state: RwLock<GuardState>,
}

impl RouteGuard {
    /// Creates a guard that only requires an authenticated session.
    #[must_use]
    pub fn new(context: Arc<AccessContext>) -> Self {
        Self {
            context,
            required_permission: None,
            state: RwLock::new(GuardState::Checking),
        }
    }

    /// Additionally requires the given permission key.
    #[must_use]
    pub fn with_required_permission(mut self, key: impl Into<String>) -> Self {
        self.required_permission = Some(key.into());
        self
    }

    /// Returns the state of the most recent evaluation.
    #[must_use]
    pub fn state(&self) -> GuardState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the authorization check once.
    ///
    /// Loads the profile through `source` if it is not yet cached; a failed
    /// load is logged and the check proceeds with whatever state resulted, so
    /// plain authentication checks stay usable when the profile endpoint is
    /// down. A missing or partial session is purged before denying.
    pub async fn evaluate(&self, source: &dyn ProfileSource) -> GuardState {
        self.set_state(GuardState::Checking);

        // Snapshotting heals a partial credential/flag pair on its own.
        let snapshot = self.context.store().snapshot();
        if snapshot.credential.is_none() || !snapshot.authenticated {
            if let Err(err) = self.context.store().clear_session() {
                warn!(error = %err, "failed to purge stale session fields");
            }
            self.context.clear();
            return self.set_state(GuardState::DeniedNotAuthenticated);
        }

        if self.context.profile().is_none() {
            if let Err(err) = self.context.load_profile(source).await {
                warn!(error = %err, "profile load failed during route check");
            }
        }

        if let Some(key) = &self.required_permission {
            if !self.context.has_permission(key) {
                return self.set_state(GuardState::DeniedNoPermission);
            }
        }

        self.set_state(GuardState::Allowed)
    }

    fn set_state(&self, state: GuardState) -> GuardState {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::profile::ProfilePayload;
    use crate::role::Role;
    use crate::store::SessionStore;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct StaticSource(ProfilePayload);

    #[async_trait]
    impl ProfileSource for StaticSource {
        async fn fetch_profile(&self) -> Result<ProfilePayload, AccessError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ProfileSource for FailingSource {
        async fn fetch_profile(&self) -> Result<ProfilePayload, AccessError> {
            Err(AccessError::ProfileFetch {
                reason: "profile endpoint down".to_string(),
            })
        }
    }

    fn payload(roles: &[&str], permissions: &[&str]) -> ProfilePayload {
        ProfilePayload {
            user_id: "u1".into(),
            username: "alice".to_string(),
            nick_name: None,
            avatar: None,
            status: None,
            create_time: None,
            roles: roles.iter().map(|k| Role::new(*k)).collect(),
            permissions: permissions.iter().map(|k| k.to_string()).collect(),
            menus: Vec::new(),
        }
    }

    fn context_with_session(dir: &TempDir) -> Arc<AccessContext> {
        let store =
            Arc::new(SessionStore::open(dir.path().join("session.json")).expect("open store"));
        store.set_session("tok1", "alice").expect("set session");
        Arc::new(AccessContext::new(store))
    }

    #[tokio::test]
    async fn allowed_with_session_and_no_required_permission() {
        let dir = TempDir::new().expect("tempdir");
        let context = context_with_session(&dir);
        let guard = RouteGuard::new(context);

        let state = guard.evaluate(&StaticSource(payload(&[], &[]))).await;

        assert_eq!(state, GuardState::Allowed);
        assert!(state.allows());
        assert!(state.redirect().is_none());
    }

    #[tokio::test]
    async fn denied_without_session_redirects_to_login() {
        let dir = TempDir::new().expect("tempdir");
        let store =
            Arc::new(SessionStore::open(dir.path().join("session.json")).expect("open store"));
        let guard = RouteGuard::new(Arc::new(AccessContext::new(store)));

        let state = guard.evaluate(&StaticSource(payload(&[], &[]))).await;

        assert_eq!(state, GuardState::DeniedNotAuthenticated);
        assert_eq!(state.redirect(), Some(RedirectTarget::Login));
    }

    #[tokio::test]
    async fn partial_session_is_purged_and_denied() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"isLoggedIn": "true", "userName": "alice"}"#).expect("seed file");
        let store = Arc::new(SessionStore::open(&path).expect("open store"));
        let guard = RouteGuard::new(Arc::new(AccessContext::new(store.clone())));

        let state = guard.evaluate(&StaticSource(payload(&[], &[]))).await;

        assert_eq!(state, GuardState::DeniedNotAuthenticated);
        assert!(store.username().is_none());
    }

    #[tokio::test]
    async fn permission_gate_denies_without_grant() {
        let dir = TempDir::new().expect("tempdir");
        let context = context_with_session(&dir);
        let guard =
            RouteGuard::new(context).with_required_permission("reports.view");

        let state = guard
            .evaluate(&StaticSource(payload(&["editor"], &["tasks.edit"])))
            .await;

        assert_eq!(state, GuardState::DeniedNoPermission);
        assert_eq!(state.redirect(), Some(RedirectTarget::Forbidden));
    }

    #[tokio::test]
    async fn admin_passes_any_permission_gate() {
        let dir = TempDir::new().expect("tempdir");
        let context = context_with_session(&dir);
        let guard =
            RouteGuard::new(context).with_required_permission("reports.view");

        let state = guard
            .evaluate(&StaticSource(payload(&["admin"], &[])))
            .await;

        assert_eq!(state, GuardState::Allowed);
    }

    #[tokio::test]
    async fn profile_failure_is_not_fatal_for_plain_auth() {
        let dir = TempDir::new().expect("tempdir");
        let context = context_with_session(&dir);
        let guard = RouteGuard::new(context.clone());

        let state = guard.evaluate(&FailingSource).await;

        assert_eq!(state, GuardState::Allowed);

        // A permission-gated guard on the same session is denied, since the
        // permission set stayed empty.
        let gated = RouteGuard::new(context).with_required_permission("reports.view");
        assert_eq!(gated.evaluate(&FailingSource).await, GuardState::DeniedNoPermission);
    }

    #[tokio::test]
    async fn cached_profile_is_not_refetched() {
        let dir = TempDir::new().expect("tempdir");
        let context = context_with_session(&dir);
        context
            .load_profile(&StaticSource(payload(&[], &["tasks.edit"])))
            .await
            .expect("preload");

        // A now-failing source does not disturb the cached grants.
        let guard = RouteGuard::new(context).with_required_permission("tasks.edit");
        assert_eq!(guard.evaluate(&FailingSource).await, GuardState::Allowed);
    }
}
