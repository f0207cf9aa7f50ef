//! Local-vs-tunnel endpoint selection.
//!
//! At startup the resolver probes the backend's `/status` on the local
//! network. A 2xx answer selects the local chat URL; anything else (non-2xx,
//! refused, DNS failure, timeout) selects the tunnel chat URL. The choice is
//! written into an [`ActiveEndpoint`] exactly once and never retried.
//!
//! ```rust,ignore
//! let endpoint = ActiveEndpoint::new(config.tunnel_chat_url());
//! let resolver = EndpointResolver::new(client.clone(), &config);
//! tokio::spawn(resolver.resolve_into(endpoint.clone()));
//! ```

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::config::ChatConfig;
use crate::error::ChatError;

/// Which backend address the resolver picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Local,
    Tunnel,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Local => write!(f, "local"),
            Route::Tunnel => write!(f, "tunnel"),
        }
    }
}

/// The chat URL currently in effect.
///
/// Starts at a fallback value and can be overwritten once. Clones share the
/// same state, so a session holding a clone sees the resolver's write as soon
/// as it lands; a send that starts earlier uses the fallback.
#[derive(Debug, Clone)]
pub struct ActiveEndpoint {
    inner: Arc<EndpointState>,
}

#[derive(Debug)]
struct EndpointState {
    fallback: String,
    resolved: OnceLock<String>,
}

impl ActiveEndpoint {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EndpointState {
                fallback: fallback.into(),
                resolved: OnceLock::new(),
            }),
        }
    }

    pub fn current(&self) -> &str {
        self.inner
            .resolved
            .get()
            .map(String::as_str)
            .unwrap_or(self.inner.fallback.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get().is_some()
    }

    /// Overwrite the fallback. Returns `false` (and leaves the URL alone) if
    /// the endpoint was already set.
    pub fn set(&self, url: impl Into<String>) -> bool {
        match self.inner.resolved.set(url.into()) {
            Ok(()) => true,
            Err(rejected) => {
                debug!(
                    current = %self.current(),
                    rejected = %rejected,
                    "endpoint already resolved, ignoring update"
                );
                false
            }
        }
    }
}

/// Probes the local backend and records the resulting chat URL.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    client: reqwest::Client,
    status_url: String,
    local_chat_url: String,
    tunnel_chat_url: String,
}

impl EndpointResolver {
    pub fn new(client: reqwest::Client, config: &ChatConfig) -> Self {
        Self {
            client,
            status_url: config.local_status_url(),
            local_chat_url: config.local_chat_url(),
            tunnel_chat_url: config.tunnel_chat_url(),
        }
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    pub fn chat_url(&self, route: Route) -> &str {
        match route {
            Route::Local => &self.local_chat_url,
            Route::Tunnel => &self.tunnel_chat_url,
        }
    }

    /// Issue the `GET /status` request.
    ///
    /// # Returns
    /// - `Ok(())` on any 2xx status. The body is not read.
    /// - `Err(ChatError::Connect)` when no response arrives.
    /// - `Err(ChatError::Http)` on a non-2xx status.
    pub async fn check_status(&self) -> Result<(), ChatError> {
        let resp = self
            .client
            .get(&self.status_url)
            .send()
            .await
            .map_err(|e| ChatError::connect(&self.status_url, e))?;

        if !resp.status().is_success() {
            return Err(ChatError::Http {
                status: resp.status().as_u16(),
                url: self.status_url.clone(),
            });
        }
        Ok(())
    }

    /// Decide the route. Never fails: every error means [`Route::Tunnel`].
    pub async fn probe(&self) -> Route {
        match self.check_status().await {
            Ok(()) => Route::Local,
            Err(e) => {
                warn!(
                    error = %e,
                    tunnel = %self.tunnel_chat_url,
                    "local backend unreachable, using tunnel URL"
                );
                Route::Tunnel
            }
        }
    }

    /// Probe once and write the chosen chat URL into `endpoint`.
    pub async fn resolve(&self, endpoint: &ActiveEndpoint) {
        let route = self.probe().await;
        let url = self.chat_url(route);
        if endpoint.set(url) {
            debug!(%route, %url, "chat endpoint resolved");
        }
    }

    /// Owned form of [`resolve`](Self::resolve), convenient for `tokio::spawn`.
    pub async fn resolve_into(self, endpoint: ActiveEndpoint) {
        self.resolve(&endpoint).await;
    }
}
