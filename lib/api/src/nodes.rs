//! Worker node resource API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use punchcard_core::NodeId;
use punchcard_gateway::{Gateway, GatewayError};
use serde::{Deserialize, Serialize};

/// Connectivity state of a node as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
    Maintenance,
}

/// Whether a node coordinates work or executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Master,
    Worker,
}

/// Coarse performance rating of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceRating {
    Good,
    Medium,
    Poor,
}

/// A worker node registered with the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub ip: String,
    pub status: NodeStatus,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub performance: Option<PerformanceRating>,
    /// CPU utilization percentage.
    #[serde(default)]
    pub cpu: Option<u8>,
    /// Memory utilization percentage.
    #[serde(default)]
    pub memory: Option<u8>,
    /// Number of tasks currently assigned.
    #[serde(default)]
    pub tasks: Option<u32>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Fields for creating or updating a node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraft {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl NodeDraft {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, ip: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            ip: ip.into(),
            kind,
            region: None,
            platform: None,
        }
    }

    /// Sets the region label.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the platform label.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Result of a node connectivity test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    /// Whether the node answered.
    pub reachable: bool,
    /// Round-trip latency in milliseconds, when reachable.
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Node management operations.
pub struct NodesApi {
    gateway: Arc<Gateway>,
}

impl NodesApi {
    /// Creates the API over a gateway.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Lists all registered nodes.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn list(&self) -> Result<Vec<Node>, GatewayError> {
        self.gateway.get("/nodes").await?.data_as()
    }

    /// Fetches a single node.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn get(&self, id: &NodeId) -> Result<Node, GatewayError> {
        self.gateway.get(&format!("/nodes/{id}")).await?.data_as()
    }

    /// Registers a new node and returns the created record.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn create(&self, draft: &NodeDraft) -> Result<Node, GatewayError> {
        self.gateway
            .post("/nodes", encode_draft(draft)?)
            .await?
            .data_as()
    }

    /// Updates a node and returns the new record.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn update(&self, id: &NodeId, draft: &NodeDraft) -> Result<Node, GatewayError> {
        self.gateway
            .put(&format!("/nodes/{id}"), encode_draft(draft)?)
            .await?
            .data_as()
    }

    /// Removes a node.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn delete(&self, id: &NodeId) -> Result<(), GatewayError> {
        self.gateway.delete(&format!("/nodes/{id}")).await?;
        Ok(())
    }

    /// Runs a connectivity test against a node.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn test_connection(&self, id: &NodeId) -> Result<ConnectivityReport, GatewayError> {
        self.gateway
            .get(&format!("/nodes/{id}/test"))
            .await?
            .data_as()
    }
}

fn encode_draft(draft: &NodeDraft) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(draft).map_err(|err| GatewayError::Unknown {
        code: 0,
        message: Some(format!("unencodable node draft: {err}")),
    })
}
