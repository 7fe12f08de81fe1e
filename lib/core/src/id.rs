//! Strongly-typed ID types for domain entities.
//!
//! All identifiers are minted by the backend and treated as opaque strings on
//! the client. The wrappers exist so that, for example, a task ID cannot be
//! passed where a node ID is expected when building request paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a strongly-typed wrapper around an opaque backend ID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from a backend-supplied value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account.
    UserId
);

define_id!(
    /// Unique identifier for a worker node.
    NodeId
);

define_id!(
    /// Unique identifier for a scheduled sign-in task.
    TaskId
);

define_id!(
    /// Unique identifier for a plugin, installed or in the store.
    PluginId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display_is_opaque_value() {
        let id = NodeId::new("node-7");
        assert_eq!(id.to_string(), "node-7");
    }

    #[test]
    fn task_id_from_str() {
        let id: TaskId = "task_42".into();
        assert_eq!(id.as_str(), "task_42");
    }

    #[test]
    fn id_equality() {
        let id1 = PluginId::new("weibo-checkin");
        let id2 = PluginId::new("weibo-checkin");
        assert_eq!(id1, id2);
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;

        let id1 = NodeId::new("a");
        let id2 = NodeId::new("b");

        let mut set = HashSet::new();
        set.insert(id1.clone());
        set.insert(id2);
        set.insert(id1); // duplicate

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = TaskId::new("task_42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"task_42\"");
        let parsed: TaskId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
