//! Log resource API: system, task, and node log listings plus export.
//!
//! Exports go through the gateway's download path, which attaches the bearer
//! credential and returns the raw file bytes instead of a response envelope.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use punchcard_core::{NodeId, TaskId};
use punchcard_gateway::{Gateway, GatewayError};
use serde::{Deserialize, Serialize};

use crate::query::append_query;

/// Which log stream an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    System,
    Task,
    Node,
}

impl LogKind {
    /// Returns the path segment for this stream.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Task => "task",
            Self::Node => "node",
        }
    }
}

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as its wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One log entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub level: Option<LogLevel>,
    pub message: String,
    /// Originating component (plugin, node, subsystem), when known.
    #[serde(default)]
    pub source: Option<String>,
}

/// Filter window for log listings and exports.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    page: Option<u32>,
    size: Option<u32>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    level: Option<LogLevel>,
    task_id: Option<TaskId>,
    node_id: Option<NodeId>,
}

impl LogQuery {
    /// Creates an unbounded query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the given page (1-based).
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Requests the given page size.
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Only entries at or after this time.
    #[must_use]
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Only entries before this time.
    #[must_use]
    pub fn with_end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Only entries at this severity.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Only entries for this task (task logs).
    #[must_use]
    pub fn with_task(mut self, id: TaskId) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Only entries for this node (node logs).
    #[must_use]
    pub fn with_node(mut self, id: NodeId) -> Self {
        self.node_id = Some(id);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(start) = self.start_time {
            pairs.push(("startTime", start.to_rfc3339()));
        }
        if let Some(end) = self.end_time {
            pairs.push(("endTime", end.to_rfc3339()));
        }
        if let Some(level) = self.level {
            pairs.push(("level", level.as_str().to_string()));
        }
        if let Some(task_id) = &self.task_id {
            pairs.push(("taskId", task_id.to_string()));
        }
        if let Some(node_id) = &self.node_id {
            pairs.push(("nodeId", node_id.to_string()));
        }
        pairs
    }
}

/// Log listing, clearing, and export operations.
pub struct LogsApi {
    gateway: Arc<Gateway>,
}

impl LogsApi {
    /// Creates the API over a gateway.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Lists entries of the given log stream.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn list(&self, kind: LogKind, query: &LogQuery) -> Result<Vec<LogEntry>, GatewayError> {
        let path = append_query(&format!("/logs/{}", kind.as_str()), &query.pairs());
        self.gateway.get(&path).await?.data_as()
    }

    /// Clears the given log stream.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn clear(&self, kind: LogKind) -> Result<(), GatewayError> {
        self.gateway
            .delete(&format!("/logs/{}", kind.as_str()))
            .await?;
        Ok(())
    }

    /// Exports the given log stream as a file and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn export(&self, kind: LogKind, query: &LogQuery) -> Result<Vec<u8>, GatewayError> {
        let path = append_query(
            &format!("/logs/{}/export", kind.as_str()),
            &query.pairs(),
        );
        self.gateway.download(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Fixture, json_response};
    use chrono::TimeZone;

    #[test]
    fn query_pairs_in_declaration_order() {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).single().expect("time");
        let query = LogQuery::new()
            .with_page(1)
            .with_level(LogLevel::Error)
            .with_start_time(start)
            .with_task(TaskId::new("t1"));

        let pairs = query.pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["page", "startTime", "level", "taskId"]);
    }

    #[tokio::test]
    async fn list_builds_filtered_path() {
        let f = Fixture::signed_in(&[json_response(200, r#"{"code": 200, "data": []}"#)]);
        let logs = LogsApi::new(f.gateway.clone());

        logs.list(LogKind::Node, &LogQuery::new().with_node(NodeId::new("n1")))
            .await
            .expect("list");

        assert_eq!(
            f.transport.last_request().url,
            "https://api.example.com/api/logs/node?nodeId=n1"
        );
    }

    #[tokio::test]
    async fn list_decodes_entries() {
        let f = Fixture::signed_in(&[json_response(
            200,
            r#"{"code": 200, "data": [
                {"id": "l1", "time": "2025-07-15T08:00:00Z", "level": "info",
                 "message": "signed in, 5 points", "source": "weibo-checkin"},
                {"id": "l2", "time": "2025-07-15T08:02:01Z", "level": "error",
                 "message": "sign-in failed, network timeout"}
            ]}"#,
        )]);
        let logs = LogsApi::new(f.gateway.clone());

        let entries = logs
            .list(LogKind::System, &LogQuery::new())
            .await
            .expect("list");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Some(LogLevel::Info));
        assert_eq!(entries[1].source, None);
    }

    #[tokio::test]
    async fn clear_deletes_the_stream() {
        let f = Fixture::signed_in(&[json_response(200, r#"{"code": 200}"#)]);
        let logs = LogsApi::new(f.gateway.clone());

        logs.clear(LogKind::Task).await.expect("clear");

        assert_eq!(
            f.transport.last_request().url,
            "https://api.example.com/api/logs/task"
        );
    }

    #[tokio::test]
    async fn export_downloads_raw_bytes_with_bearer() {
        let f = Fixture::signed_in(&[json_response(200, "2025-07-15 signed in")]);
        let logs = LogsApi::new(f.gateway.clone());

        let bytes = logs
            .export(LogKind::System, &LogQuery::new().with_level(LogLevel::Warn))
            .await
            .expect("export");

        assert_eq!(bytes, b"2025-07-15 signed in");
        let request = f.transport.last_request();
        assert_eq!(
            request.url,
            "https://api.example.com/api/logs/system/export?level=warn"
        );
        assert_eq!(request.bearer.as_deref(), Some("tok1"));
    }
}
