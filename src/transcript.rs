//! Ordered chat history.

use std::path::Path;

use crate::error::ChatError;
use crate::message::Message;

/// Append-only list of messages; insertion order is display order.
///
/// The only way to remove messages is [`clear`](Self::clear), which drops all
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn to_json(&self) -> Result<String, ChatError> {
        serde_json::to_string_pretty(&self.messages).map_err(|e| ChatError::Json {
            detail: e.to_string(),
        })
    }

    /// Write the transcript to `path` as a JSON array of
    /// `{ "text", "sender" }` objects, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ChatError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), messages = self.len(), "transcript saved");
        Ok(())
    }
}
