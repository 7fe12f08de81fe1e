//! Session lifecycle, permission checks, and route guarding for punchcard.
//!
//! This crate provides:
//! - Durable session state (`SessionStore`) with the self-healing
//!   credential/flag invariant
//! - Role- and key-based permission checks (`Role`, `RoleSet`,
//!   `PermissionSet`)
//! - The cached authorization context (`AccessContext`) loaded through a
//!   [`ProfileSource`]
//! - The route guard state machine (`RouteGuard`)
//!
//! # Access control model
//!
//! Permission keys are granted per user by the backend. A role with key
//! `admin` is a super-role: its presence makes every permission check
//! succeed.
//!
//! # Example
//!
//! ```
//! use punchcard_access::{PermissionSet, Role, RoleSet};
//!
//! let roles = RoleSet::from_roles(vec![Role::new("editor")]);
//! let permissions = PermissionSet::from_keys(vec!["tasks.edit".to_string()]);
//!
//! assert!(!roles.is_admin());
//! assert!(permissions.contains("tasks.edit"));
//! assert!(!permissions.contains("reports.view"));
//! ```

pub mod context;
pub mod error;
pub mod guard;
pub mod profile;
pub mod role;
pub mod source;
pub mod store;

// Re-export main types at crate root
pub use context::AccessContext;
pub use error::AccessError;
pub use guard::{GuardState, RedirectTarget, RouteGuard};
pub use profile::{MenuEntry, ProfilePayload, UserProfile};
pub use role::{ADMIN_ROLE_KEY, PermissionSet, Role, RoleSet};
pub use source::ProfileSource;
pub use store::{SessionSnapshot, SessionStore};
