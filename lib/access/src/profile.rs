//! User profile and menu types.
//!
//! The profile is fetched lazily the first time an authenticated view needs
//! authorization data, and the single `/user/info` payload carries the basic
//! account fields together with the role, permission, and menu grants.

use chrono::{DateTime, Utc};
use punchcard_core::UserId;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Basic account information for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend-assigned user identifier.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Display name; falls back to the login name when the backend omits it.
    pub nick_name: String,
    /// Avatar reference; empty when unset.
    pub avatar: String,
    /// Account status as reported by the backend.
    pub status: Option<String>,
    /// When the account was created.
    pub create_time: Option<DateTime<Utc>>,
}

/// A navigation menu entry granted to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    /// Display label.
    pub name: String,
    /// Route path the entry navigates to.
    pub path: String,
    /// Icon reference, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Nested entries, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

/// The `/user/info` response payload.
///
/// Nested collections default to empty so a backend that omits them still
/// yields a usable (if permissionless) profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Backend-assigned user identifier.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Display name, when set.
    #[serde(default)]
    pub nick_name: Option<String>,
    /// Avatar reference, when set.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Account status.
    #[serde(default)]
    pub status: Option<String>,
    /// When the account was created.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// Assigned roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Granted permission keys.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Granted menu entries, in display order.
    #[serde(default)]
    pub menus: Vec<MenuEntry>,
}

impl UserProfile {
    /// Builds the profile view of a payload, applying display defaults.
    #[must_use]
    pub fn from_payload(payload: &ProfilePayload) -> Self {
        Self {
            user_id: payload.user_id.clone(),
            username: payload.username.clone(),
            nick_name: payload
                .nick_name
                .clone()
                .unwrap_or_else(|| payload.username.clone()),
            avatar: payload.avatar.clone().unwrap_or_default(),
            status: payload.status.clone(),
            create_time: payload.create_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_payload() -> ProfilePayload {
        serde_json::from_str(r#"{"userId": "u1", "username": "alice"}"#).expect("deserialize")
    }

    #[test]
    fn payload_defaults_missing_collections_to_empty() {
        let payload = minimal_payload();
        assert!(payload.roles.is_empty());
        assert!(payload.permissions.is_empty());
        assert!(payload.menus.is_empty());
    }

    #[test]
    fn nick_name_falls_back_to_username() {
        let profile = UserProfile::from_payload(&minimal_payload());
        assert_eq!(profile.nick_name, "alice");
        assert_eq!(profile.avatar, "");
    }

    #[test]
    fn payload_deserializes_full_shape() {
        let payload: ProfilePayload = serde_json::from_str(
            r#"{
                "userId": "u1",
                "username": "alice",
                "nickName": "Alice",
                "avatar": "avatars/a.png",
                "status": "active",
                "createTime": "2025-07-01T08:00:00Z",
                "roles": [{"roleKey": "admin"}],
                "permissions": ["tasks.edit"],
                "menus": [
                    {"name": "Tasks", "path": "/tasks", "children": [
                        {"name": "History", "path": "/tasks/history"}
                    ]}
                ]
            }"#,
        )
        .expect("deserialize");

        assert_eq!(payload.roles.len(), 1);
        assert_eq!(payload.permissions, vec!["tasks.edit"]);
        assert_eq!(payload.menus[0].children.len(), 1);

        let profile = UserProfile::from_payload(&payload);
        assert_eq!(profile.nick_name, "Alice");
        assert_eq!(profile.avatar, "avatars/a.png");
        assert!(profile.create_time.is_some());
    }

    #[test]
    fn menu_order_is_preserved() {
        let payload: ProfilePayload = serde_json::from_str(
            r#"{
                "userId": "u1",
                "username": "alice",
                "menus": [
                    {"name": "Home", "path": "/"},
                    {"name": "Nodes", "path": "/nodes"},
                    {"name": "Tasks", "path": "/tasks"}
                ]
            }"#,
        )
        .expect("deserialize");

        let names: Vec<&str> = payload.menus.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Nodes", "Tasks"]);
    }
}
