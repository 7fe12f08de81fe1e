//! Centralized console configuration.
//!
//! This module provides strongly-typed configuration for the console,
//! loaded via the `config` crate from `PUNCHCARD_`-prefixed environment
//! variables. Every field has a default so the console runs unconfigured
//! against a local backend.

use serde::Deserialize;
use std::path::PathBuf;

/// Console configuration.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Primary API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Plugin-store API base URL.
    #[serde(default = "default_store_base_url")]
    pub store_base_url: String,

    /// Directory holding the persisted session state.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_store_base_url() -> String {
    "https://store.punchcard.io/api".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".punchcard")
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured value cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("PUNCHCARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the path of the session state file.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            store_base_url: default_store_base_url(),
            state_dir: default_state_dir(),
        }
    }
}
