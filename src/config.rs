//! Backend addresses and client settings.
//!
//! The two candidate base URLs are baked in as defaults; a TOML file or CLI
//! flags may override them. Missing fields in a config file fall back to the
//! built-in values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ChatError;

/// Base URL of the backend on the local network.
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://10.72.8.178:5000";
/// Base URL reachable through the SSH tunnel.
pub const DEFAULT_TUNNEL_BASE_URL: &str = "http://localhost:5000";
/// Label shown in front of bot replies.
pub const DEFAULT_BOT_NAME: &str = "HossBot";

const STATUS_PATH: &str = "/status";
const CHAT_PATH: &str = "/chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub local_base_url: String,
    pub tunnel_base_url: String,
    pub bot_name: String,
    /// TCP connect timeout for both probe and chat calls. `None` leaves the
    /// platform default in charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
            tunnel_base_url: DEFAULT_TUNNEL_BASE_URL.to_string(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            connect_timeout_ms: None,
        }
    }
}

impl ChatConfig {
    /// Read a TOML config file.
    ///
    /// # Errors
    /// - `ChatError::Io` when the file cannot be read.
    /// - `ChatError::Config` when it is not valid TOML for this shape.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ChatError> {
        toml::from_str::<ChatConfig>(content).map_err(|e| ChatError::Config {
            path: origin.to_string(),
            detail: e.to_string(),
        })
    }

    /// `GET` target used by the endpoint resolver.
    pub fn local_status_url(&self) -> String {
        join_path(&self.local_base_url, STATUS_PATH)
    }

    pub fn local_chat_url(&self) -> String {
        join_path(&self.local_base_url, CHAT_PATH)
    }

    /// Chat URL used when the local backend is unreachable, and before
    /// resolution finishes.
    pub fn tunnel_chat_url(&self) -> String {
        join_path(&self.tunnel_base_url, CHAT_PATH)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Build the HTTP client shared by the resolver and the session.
    ///
    /// No overall request timeout is set.
    pub fn http_client(&self) -> reqwest::Client {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        // Builder failure only happens when the TLS backend cannot initialise;
        // fall back to a default client instead of panicking.
        builder.build().unwrap_or_default()
    }
}

fn join_path(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
