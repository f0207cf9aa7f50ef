//! Crate-level error type.

use thiserror::Error;

/// Errors produced while talking to the chat backend or loading configuration.
///
/// Each variant carries enough context to diagnose the failure from a log line
/// alone. None of them is fatal to a chat session: the session turns send
/// errors into a logged [`SendOutcome::Failed`](crate::session::SendOutcome).
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request never produced a complete response (refused, DNS, timeout,
    /// body cut off, ...).
    #[error("connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },

    /// The backend replied with a non-2xx HTTP status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body was not the expected JSON shape.
    #[error("malformed response body: {detail}")]
    Json { detail: String },

    /// The JSON body parsed but carried no `reply` string.
    #[error("response body has no `reply` field")]
    MissingReply,

    /// A configuration file could not be parsed.
    #[error("invalid config {path}: {detail}")]
    Config { path: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Classify a transport-level `reqwest` failure for `url`.
    pub(crate) fn connect(url: &str, err: reqwest::Error) -> Self {
        ChatError::Connect {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}
