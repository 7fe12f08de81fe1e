//! In-memory reflection of the signed-in user's authorization data.
//!
//! The [`AccessContext`] caches the profile, role, permission, and menu
//! grants loaded through a [`ProfileSource`]. It is an explicit context
//! object: constructed once at startup, injected into whatever needs it, and
//! reset through [`AccessContext::clear`], never read from ambient scope.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::error::AccessError;
use crate::profile::{MenuEntry, ProfilePayload, UserProfile};
use crate::role::{PermissionSet, RoleSet};
use crate::source::ProfileSource;
use crate::store::SessionStore;

#[derive(Debug, Default)]
struct ProfileState {
    profile: Option<UserProfile>,
    roles: RoleSet,
    permissions: PermissionSet,
    menus: Vec<MenuEntry>,
    loading: bool,
    last_error: Option<String>,
}

/// Cached authorization data for the current session.
///
/// Profile-clearing and credential-clearing are independent: this context
/// never touches the [`SessionStore`] session fields, and the store knows
/// nothing about the cached profile. Callers compose the two.
#[derive(Debug)]
pub struct AccessContext {
    store: Arc<SessionStore>,
    state: RwLock<ProfileState>,
}

impl AccessContext {
    /// Creates an empty context over the given session store.
    #[must_use]
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            state: RwLock::new(ProfileState::default()),
        }
    }

    /// Returns the session store this context reads credentials from.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Loads the signed-in user's profile through `source`.
    ///
    /// A no-op when no credential is persisted. On success the cached state
    /// is replaced in a single swap, so concurrent callers observe either the
    /// prior state or the fully loaded one, never a half-written profile.
    /// On failure the prior state is left untouched and the error message is
    /// recorded for observability.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording it.
    pub async fn load_profile(&self, source: &dyn ProfileSource) -> Result<(), AccessError> {
        if self.store.credential().is_none() {
            debug!("no credential persisted; skipping profile load");
            return Ok(());
        }

        {
            let mut state = self.write();
            state.loading = true;
            state.last_error = None;
        }

        // The fetch runs without holding the lock; the swap below is the only
        // point where other callers can observe the result.
        match source.fetch_profile().await {
            Ok(payload) => {
                *self.write() = Self::loaded_state(&payload);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load user profile");
                let mut state = self.write();
                state.loading = false;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Returns true if the signed-in user holds the given permission key.
    ///
    /// True iff the admin super-role is present or the key was granted.
    /// Never errors; with no profile loaded every check is false.
    #[must_use]
    pub fn has_permission(&self, key: &str) -> bool {
        let state = self.read();
        state.roles.is_admin() || state.permissions.contains(key)
    }

    /// Returns true if the signed-in user holds the admin super-role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read().roles.is_admin()
    }

    /// Resets all cached authorization data. Idempotent.
    ///
    /// Does not touch the persisted credential; see the type-level note.
    pub fn clear(&self) {
        *self.write() = ProfileState::default();
    }

    /// Returns the cached profile, if one has been loaded.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    /// Returns the cached role set.
    #[must_use]
    pub fn roles(&self) -> RoleSet {
        self.read().roles.clone()
    }

    /// Returns the cached permission set.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.read().permissions.clone()
    }

    /// Returns the cached menu entries, in display order.
    #[must_use]
    pub fn menus(&self) -> Vec<MenuEntry> {
        self.read().menus.clone()
    }

    /// Returns true while a profile load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// Returns the message of the most recent failed profile load.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    fn loaded_state(payload: &ProfilePayload) -> ProfileState {
        ProfileState {
            profile: Some(UserProfile::from_payload(payload)),
            roles: RoleSet::from_roles(payload.roles.clone()),
            permissions: PermissionSet::from_keys(payload.permissions.clone()),
            menus: payload.menus.clone(),
            loading: false,
            last_error: None,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProfileState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProfileState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
