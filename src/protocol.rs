//! JSON bodies exchanged with the chat backend.

use serde::{Deserialize, Serialize};

// -- Chat endpoint ----------------------------------------------------------

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
    pub user_id: &'a str,
}

/// Success body of `POST /chat`.
///
/// `reply` is optional so that a well-formed body without it can be told apart
/// from one that is not JSON at all.
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}
