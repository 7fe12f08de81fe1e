//! Scheduled sign-in task resource API.
//!
//! The `cron` field is an opaque string on the client: the console builds
//! and displays expressions but never parses or evaluates them. Scheduling
//! happens on the worker nodes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use punchcard_core::{PluginId, TaskId};
use punchcard_gateway::{Gateway, GatewayError, RequestDescriptor, Verb};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::{PageQuery, append_query};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Scheduled and runnable.
    Active,
    /// Suspended; keeps its schedule but does not run.
    Paused,
    /// Currently executing.
    Running,
    /// Last execution failed.
    Failed,
}

/// A scheduled sign-in task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub plugin_id: PluginId,
    #[serde(default)]
    pub plugin_name: Option<String>,
    /// CRON expression, opaque to the console.
    pub cron: String,
    pub status: TaskStatus,
    /// Plugin-specific configuration blob.
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
}

/// Fields for creating or updating a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    pub plugin_id: PluginId,
    pub cron: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl TaskDraft {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        plugin_id: impl Into<PluginId>,
        cron: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            plugin_id: plugin_id.into(),
            cron: cron.into(),
            config: None,
        }
    }

    /// Attaches a plugin-specific configuration blob.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Outcome of a single task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Running,
}

/// One entry in a task's execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub id: String,
    pub task_id: TaskId,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Task management operations.
pub struct TasksApi {
    gateway: Arc<Gateway>,
}

impl TasksApi {
    /// Creates the API over a gateway.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Lists tasks within the given page window.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn list(&self, page: &PageQuery) -> Result<Vec<Task>, GatewayError> {
        let path = append_query("/tasks", &page.pairs());
        self.gateway.get(&path).await?.data_as()
    }

    /// Fetches a single task.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn get(&self, id: &TaskId) -> Result<Task, GatewayError> {
        self.gateway.get(&format!("/tasks/{id}")).await?.data_as()
    }

    /// Creates a task and returns the created record.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, GatewayError> {
        self.gateway
            .post("/tasks", encode_draft(draft)?)
            .await?
            .data_as()
    }

    /// Updates a task and returns the new record.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, GatewayError> {
        self.gateway
            .put(&format!("/tasks/{id}"), encode_draft(draft)?)
            .await?
            .data_as()
    }

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn delete(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.gateway.delete(&format!("/tasks/{id}")).await?;
        Ok(())
    }

    /// Triggers an immediate execution.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn execute(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.gateway
            .send(RequestDescriptor::new(
                Verb::Post,
                format!("/tasks/{id}/execute"),
            ))
            .await?;
        Ok(())
    }

    /// Suspends the task's schedule.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn pause(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.gateway
            .send(RequestDescriptor::new(
                Verb::Post,
                format!("/tasks/{id}/pause"),
            ))
            .await?;
        Ok(())
    }

    /// Resumes a paused task.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn resume(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.gateway
            .send(RequestDescriptor::new(
                Verb::Post,
                format!("/tasks/{id}/resume"),
            ))
            .await?;
        Ok(())
    }

    /// Fetches the task's execution history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn history(&self, id: &TaskId) -> Result<Vec<TaskRun>, GatewayError> {
        self.gateway
            .get(&format!("/tasks/{id}/history"))
            .await?
            .data_as()
    }
}

fn encode_draft(draft: &TaskDraft) -> Result<Value, GatewayError> {
    serde_json::to_value(draft).map_err(|err| GatewayError::Unknown {
        code: 0,
        message: Some(format!("unencodable task draft: {err}")),
    })
}
