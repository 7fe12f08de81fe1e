//! Role and permission types for console access control.
//!
//! Roles and permission keys are assigned by the backend and arrive with the
//! user profile. A role whose key is `admin` is a super-role: its presence
//! makes every permission check succeed regardless of the granted keys.

use serde::{Deserialize, Serialize};

/// Role key that grants every permission.
pub const ADMIN_ROLE_KEY: &str = "admin";

/// A role assigned to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Stable role key (e.g. `admin`, `editor`).
    pub role_key: String,
    /// Human-readable role name, when the backend supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl Role {
    /// Creates a role from its key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            role_key: key.into(),
            role_name: None,
        }
    }

    /// Returns true if this is the admin super-role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role_key == ADMIN_ROLE_KEY
    }
}

/// Set of roles assigned to the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self { roles: Vec::new() }
    }

    /// Creates a role set from backend-supplied roles.
    #[must_use]
    pub fn from_roles(roles: Vec<Role>) -> Self {
        Self { roles }
    }

    /// Returns true if any role is the admin super-role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    /// Returns the roles as a slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns true if no roles are assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Set of permission keys granted to the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    keys: Vec<String>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn none() -> Self {
        Self { keys: Vec::new() }
    }

    /// Creates a permission set from backend-supplied keys.
    #[must_use]
    pub fn from_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Returns true if the given key was granted.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Returns the granted keys as a slice.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns true if no keys were granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_admin() {
        assert!(Role::new("admin").is_admin());
        assert!(!Role::new("editor").is_admin());
    }

    #[test]
    fn role_set_none_is_empty() {
        let roles = RoleSet::none();
        assert!(roles.is_empty());
        assert!(!roles.is_admin());
    }

    #[test]
    fn role_set_detects_admin_among_others() {
        let roles = RoleSet::from_roles(vec![Role::new("editor"), Role::new("admin")]);
        assert!(roles.is_admin());
    }

    #[test]
    fn permission_set_contains() {
        let permissions = PermissionSet::from_keys(vec!["tasks.edit".to_string()]);
        assert!(permissions.contains("tasks.edit"));
        assert!(!permissions.contains("tasks.delete"));
    }

    #[test]
    fn role_deserializes_from_camel_case() {
        let role: Role =
            serde_json::from_str(r#"{"roleKey": "admin", "roleName": "Administrator"}"#)
                .expect("deserialize");
        assert!(role.is_admin());
        assert_eq!(role.role_name.as_deref(), Some("Administrator"));
    }

    #[test]
    fn role_set_serde_is_transparent() {
        let roles = RoleSet::from_roles(vec![Role::new("editor")]);
        let json = serde_json::to_string(&roles).expect("serialize");
        assert!(json.starts_with('['));
        let parsed: RoleSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(roles, parsed);
    }
}
