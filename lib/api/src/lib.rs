//! Typed resource APIs for the punchcard console.
//!
//! Each module wraps one backend resource (auth, nodes, tasks, plugins,
//! logs) over the request gateway. The APIs carry the wire models and path
//! building; error classification, credential attachment, and host selection
//! stay in the gateway.

pub mod auth;
pub mod logs;
pub mod nodes;
pub mod plugins;
pub mod query;
pub mod tasks;

#[cfg(test)]
mod testutil;

// Re-export main types at crate root
pub use auth::{AuthApi, LoginOutcome, ProfileUpdate};
pub use logs::{LogEntry, LogKind, LogLevel, LogQuery, LogsApi};
pub use nodes::{ConnectivityReport, Node, NodeDraft, NodeKind, NodeStatus, NodesApi, PerformanceRating};
pub use plugins::{Plugin, PluginsApi, StorePlugin};
pub use query::PageQuery;
pub use tasks::{RunStatus, Task, TaskDraft, TaskRun, TaskStatus, TasksApi};
