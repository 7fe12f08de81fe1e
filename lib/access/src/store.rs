//! Durable client-side session state.
//!
//! The console persists its session the same way the browser build did: a
//! small key/value map with the literal keys `token`, `isLoggedIn`, and
//! `userName`, plus the locally mocked `installedApps` list used by the
//! plugin-store view. The map is backed by a JSON file at a caller-supplied
//! path so tests can isolate their own stores.
//!
//! The store self-heals: a credential without the logged-in flag (or the
//! reverse) is never reported to callers. Partial state is treated as
//! signed-out and actively cleared at read time.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::error::AccessError;

const KEY_TOKEN: &str = "token";
const KEY_LOGGED_IN: &str = "isLoggedIn";
const KEY_USER_NAME: &str = "userName";
const KEY_INSTALLED_APPS: &str = "installedApps";

/// The only value the logged-in flag may hold; anything else is stale.
const LOGGED_IN_VALUE: &str = "true";

/// A consistent view of the persisted session fields.
///
/// `authenticated == true` implies `credential` is present; the store
/// guarantees this by healing any observed violation before answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The opaque bearer credential, if a session is active.
    pub credential: Option<String>,
    /// Whether the logged-in flag is set.
    pub authenticated: bool,
    /// The signed-in username, if recorded.
    pub username: Option<String>,
}

impl SessionSnapshot {
    fn signed_out() -> Self {
        Self {
            credential: None,
            authenticated: false,
            username: None,
        }
    }
}

/// File-backed key/value store for session state.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl SessionStore {
    /// Opens the store at `path`, loading any previously persisted state.
    ///
    /// A missing file is an empty store. A file that cannot be decoded is
    /// discarded with a warning rather than failing the open; stale local
    /// state must never lock the user out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AccessError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "discarding undecodable session state");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(AccessError::StoreIo {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                });
            }
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns a consistent view of the session fields, healing partial state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut entries = self.write_entries();
        let token = entries.get(KEY_TOKEN).cloned();
        let flagged = entries
            .get(KEY_LOGGED_IN)
            .is_some_and(|v| v == LOGGED_IN_VALUE);

        match (token, flagged) {
            (Some(credential), true) => SessionSnapshot {
                credential: Some(credential),
                authenticated: true,
                username: entries.get(KEY_USER_NAME).cloned(),
            },
            (None, false) => SessionSnapshot::signed_out(),
            _ => {
                // Credential without flag, or flag without credential.
                warn!("inconsistent persisted session fields; clearing");
                Self::remove_session_keys(&mut entries);
                if let Err(err) = self.persist(&entries) {
                    warn!(error = %err, "failed to persist healed session state");
                }
                SessionSnapshot::signed_out()
            }
        }
    }

    /// Returns the stored bearer credential, if a consistent session exists.
    pub fn credential(&self) -> Option<String> {
        self.snapshot().credential
    }

    /// Returns true if a consistent, authenticated session is persisted.
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().authenticated
    }

    /// Returns the signed-in username, if a consistent session exists.
    pub fn username(&self) -> Option<String> {
        self.snapshot().username
    }

    /// Persists a freshly established session.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn set_session(&self, token: &str, username: &str) -> Result<(), AccessError> {
        let mut entries = self.write_entries();
        entries.insert(KEY_TOKEN.to_string(), token.to_string());
        entries.insert(KEY_LOGGED_IN.to_string(), LOGGED_IN_VALUE.to_string());
        entries.insert(KEY_USER_NAME.to_string(), username.to_string());
        self.persist(&entries)
    }

    /// Removes the session fields, leaving unrelated keys (such as the
    /// installed-apps list) untouched. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn clear_session(&self) -> Result<(), AccessError> {
        let mut entries = self.write_entries();
        if !Self::remove_session_keys(&mut entries) {
            return Ok(());
        }
        self.persist(&entries)
    }

    /// Returns the locally recorded installed-app identifiers.
    ///
    /// The list is stored as a JSON-encoded array under `installedApps`;
    /// an undecodable value is treated as empty.
    pub fn installed_apps(&self) -> Vec<String> {
        let entries = self.read_entries();
        let Some(raw) = entries.get(KEY_INSTALLED_APPS) else {
            return Vec::new();
        };
        match serde_json::from_str(raw) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "discarding undecodable installed-apps list");
                Vec::new()
            }
        }
    }

    /// Replaces the locally recorded installed-app identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn set_installed_apps(&self, ids: &[String]) -> Result<(), AccessError> {
        let raw = serde_json::to_string(ids).map_err(|err| AccessError::StoreSerialization {
            reason: err.to_string(),
        })?;
        let mut entries = self.write_entries();
        entries.insert(KEY_INSTALLED_APPS.to_string(), raw);
        self.persist(&entries)
    }

    /// Removes the three session keys. Returns true if anything was removed.
    fn remove_session_keys(entries: &mut BTreeMap<String, String>) -> bool {
        let mut removed = false;
        for key in [KEY_TOKEN, KEY_LOGGED_IN, KEY_USER_NAME] {
            removed |= entries.remove(key).is_some();
        }
        removed
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AccessError> {
        let raw =
            serde_json::to_string_pretty(entries).map_err(|err| AccessError::StoreSerialization {
                reason: err.to_string(),
            })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| AccessError::StoreIo {
                path: self.path.display().to_string(),
                reason: err.to_string(),
            })?;
        }
        fs::write(&self.path, raw).map_err(|err| AccessError::StoreIo {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::open(dir.path().join("session.json")).expect("open store")
    }

    #[test]
    fn open_missing_file_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        assert_eq!(store.snapshot(), SessionSnapshot::signed_out());
    }

    #[test]
    fn set_session_persists_all_fields() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.set_session("tok1", "alice").expect("set session");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.credential.as_deref(), Some("tok1"));
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.username.as_deref(), Some("alice"));
    }

    #[test]
    fn session_survives_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        SessionStore::open(&path)
            .expect("open store")
            .set_session("tok1", "alice")
            .expect("set session");

        let reopened = SessionStore::open(&path).expect("reopen store");
        assert_eq!(reopened.credential().as_deref(), Some("tok1"));
        assert_eq!(reopened.username().as_deref(), Some("alice"));
    }

    #[test]
    fn clear_session_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.set_session("tok1", "alice").expect("set session");

        store.clear_session().expect("first clear");
        let after_first = store.snapshot();
        store.clear_session().expect("second clear");

        assert_eq!(after_first, SessionSnapshot::signed_out());
        assert_eq!(store.snapshot(), after_first);
    }

    #[test]
    fn flag_without_token_is_healed() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"isLoggedIn": "true", "userName": "alice"}"#,
        )
        .expect("seed file");

        let store = SessionStore::open(&path).expect("open store");
        assert_eq!(store.snapshot(), SessionSnapshot::signed_out());

        // The healed state is persisted, not just reported.
        let reopened = SessionStore::open(&path).expect("reopen store");
        assert!(!reopened.is_authenticated());
        assert!(reopened.username().is_none());
    }

    #[test]
    fn token_without_flag_is_healed() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token": "tok1"}"#).expect("seed file");

        let store = SessionStore::open(&path).expect("open store");
        assert!(store.credential().is_none());
    }

    #[test]
    fn clear_session_keeps_installed_apps() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.set_session("tok1", "alice").expect("set session");
        store
            .set_installed_apps(&["weibo".to_string(), "zhihu".to_string()])
            .expect("set apps");

        store.clear_session().expect("clear");

        assert!(store.credential().is_none());
        assert_eq!(store.installed_apps(), vec!["weibo", "zhihu"]);
    }

    #[test]
    fn undecodable_state_file_is_discarded() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").expect("seed file");

        let store = SessionStore::open(&path).expect("open store");
        assert_eq!(store.snapshot(), SessionSnapshot::signed_out());
    }

    #[test]
    fn undecodable_installed_apps_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"installedApps": "not-an-array"}"#).expect("seed file");

        let store = SessionStore::open(&path).expect("open store");
        assert!(store.installed_apps().is_empty());
    }
}
