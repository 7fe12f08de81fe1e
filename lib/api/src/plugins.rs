//! Plugin store and installed-plugin resource API.
//!
//! Store listings come from the separate plugin-store host; everything else
//! talks to the primary API.

use std::sync::Arc;

use punchcard_core::PluginId;
use punchcard_gateway::{Gateway, GatewayError, RequestDescriptor, Verb};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::query::{PageQuery, append_query};

/// A plugin as listed by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePlugin {
    pub id: PluginId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether this console already has the plugin installed.
    #[serde(default)]
    pub installed: bool,
}

/// A plugin installed on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub id: PluginId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Plugin store and lifecycle operations.
pub struct PluginsApi {
    gateway: Arc<Gateway>,
}

impl PluginsApi {
    /// Creates the API over a gateway.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Lists plugins available in the store (plugin-store host).
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn store_plugins(&self, page: &PageQuery) -> Result<Vec<StorePlugin>, GatewayError> {
        let path = append_query("/plugins/store", &page.pairs());
        self.gateway
            .send(RequestDescriptor::new(Verb::Get, path).on_store_host())
            .await?
            .data_as()
    }

    /// Lists plugins installed on the platform.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn installed(&self) -> Result<Vec<Plugin>, GatewayError> {
        self.gateway.get("/plugins").await?.data_as()
    }

    /// Fetches a single installed plugin.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn get(&self, id: &PluginId) -> Result<Plugin, GatewayError> {
        self.gateway.get(&format!("/plugins/{id}")).await?.data_as()
    }

    /// Installs a plugin from the store.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn install(&self, id: &PluginId) -> Result<(), GatewayError> {
        self.gateway
            .post("/plugins/install", json!({ "pluginId": id }))
            .await?;
        Ok(())
    }

    /// Uninstalls a plugin.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn uninstall(&self, id: &PluginId) -> Result<(), GatewayError> {
        self.gateway
            .send(RequestDescriptor::new(
                Verb::Post,
                format!("/plugins/{id}/uninstall"),
            ))
            .await?;
        Ok(())
    }

    /// Updates an installed plugin to its latest store version.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn update_plugin(&self, id: &PluginId) -> Result<(), GatewayError> {
        self.gateway
            .send(RequestDescriptor::new(
                Verb::Post,
                format!("/plugins/{id}/update"),
            ))
            .await?;
        Ok(())
    }

    /// Uploads a custom plugin archive.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    pub async fn upload(&self, file_name: &str, archive: Vec<u8>) -> Result<(), GatewayError> {
        let path = append_query("/plugins/upload", &[("fileName", file_name.to_string())]);
        self.gateway
            .post_bytes(&path, "application/octet-stream", archive)
            .await?;
        Ok(())
    }
}
