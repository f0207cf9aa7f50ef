//! Chat session: transcript, pending state, and the send/receive cycle.
//!
//! ## Send cycle
//! 1. `submit` appends the user's message synchronously, before any I/O.
//! 2. The session is marked pending and a task is spawned to `POST` the
//!    question to whatever chat URL the [`ActiveEndpoint`] holds right now.
//! 3. A 2xx JSON body with a `reply` string appends a bot message.
//! 4. Any failure is logged and nothing is appended.
//! 5. The pending mark is dropped however the task ends.
//!
//! Submissions are not serialized: a second one may start while the first
//! is in flight, and replies land in arrival order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::composer::Composer;
use crate::endpoint::ActiveEndpoint;
use crate::error::ChatError;
use crate::message::Message;
use crate::protocol::{ChatReply, ChatRequest};
use crate::transcript::Transcript;

const EVENT_CAPACITY: usize = 256;

/// Opaque per-run identity sent as `user_id` with every chat request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Change notifications for renderers (autoscroll, typing indicator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Appended(Message),
    Cleared,
    /// `true` when the first submission starts, `false` when the last one
    /// in flight finishes.
    Pending(bool),
}

/// Terminal state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A bot reply was appended.
    Done,
    /// Nothing was appended; the cause was logged.
    Failed,
}

/// Shared handle to one conversation. Clones refer to the same session.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: reqwest::Client,
    endpoint: ActiveEndpoint,
    session_id: SessionId,
    transcript: Mutex<Transcript>,
    in_flight: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

impl ChatSession {
    pub fn new(client: reqwest::Client, endpoint: ActiveEndpoint, session_id: SessionId) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                client,
                endpoint,
                session_id,
                transcript: Mutex::new(Transcript::new()),
                in_flight: AtomicUsize::new(0),
                events,
            }),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    pub fn endpoint(&self) -> &ActiveEndpoint {
        &self.inner.endpoint
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.lock_transcript().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_transcript().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_transcript().is_empty()
    }

    /// True while at least one submission is waiting on the backend.
    pub fn is_pending(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Send `text` to the backend.
    ///
    /// Returns `None` without touching anything when `text` is blank.
    /// Otherwise the user message is already in the transcript when this
    /// returns, and the handle resolves once the exchange has finished.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, text: &str) -> Option<JoinHandle<SendOutcome>> {
        if text.trim().is_empty() {
            return None;
        }

        self.append(Message::user(text));
        let pending = PendingGuard::enter(Arc::clone(&self.inner));

        let url = self.inner.endpoint.current().to_string();
        let question = text.to_string();
        let session = self.clone();

        Some(tokio::spawn(async move {
            let _pending = pending;
            session.exchange(&url, &question).await
        }))
    }

    /// Submit the composer's buffer and leave it empty.
    ///
    /// A blank buffer is left as it is and nothing is sent.
    pub fn submit_input(&self, composer: &mut Composer) -> Option<JoinHandle<SendOutcome>> {
        if composer.is_blank() {
            return None;
        }
        let text = composer.take();
        self.submit(&text)
    }

    /// Drop every message. Replies still in flight will be appended to the
    /// emptied transcript when they arrive.
    pub fn clear(&self) {
        let mut transcript = self.lock_transcript();
        transcript.clear();
        let _ = self.inner.events.send(SessionEvent::Cleared);
    }

    async fn exchange(&self, url: &str, question: &str) -> SendOutcome {
        let request = ChatRequest {
            question,
            user_id: self.inner.session_id.as_str(),
        };
        match request_reply(&self.inner.client, url, &request).await {
            Ok(reply) => {
                debug!(%url, "reply received");
                self.append(Message::bot(reply));
                SendOutcome::Done
            }
            Err(e) => {
                warn!(error = %e, %url, "failed to send message");
                SendOutcome::Failed
            }
        }
    }

    fn append(&self, message: Message) {
        let mut transcript = self.lock_transcript();
        transcript.push(message.clone());
        // Sent under the lock so subscribers see events in transcript order.
        let _ = self.inner.events.send(SessionEvent::Appended(message));
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Transcript> {
        self.inner
            .transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds one unit of the in-flight count; released on drop so the pending
/// indicator clears even if the send task is aborted.
struct PendingGuard {
    inner: Arc<SessionInner>,
}

impl PendingGuard {
    fn enter(inner: Arc<SessionInner>) -> Self {
        if inner.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = inner.events.send(SessionEvent::Pending(true));
        }
        Self { inner }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.inner.events.send(SessionEvent::Pending(false));
        }
    }
}

/// `POST` one question to `url` and extract the reply text.
///
/// # Returns
/// - `Ok(reply)` on a 2xx response whose JSON body carries a `reply` string.
/// - `Err(ChatError::Connect)` when no response arrives or its body is cut
///   off in transit.
/// - `Err(ChatError::Http)` on a non-2xx status, whatever the body.
/// - `Err(ChatError::Json)` when the body is not the expected JSON.
/// - `Err(ChatError::MissingReply)` when `reply` is absent or null.
pub async fn request_reply(
    client: &reqwest::Client,
    url: &str,
    request: &ChatRequest<'_>,
) -> Result<String, ChatError> {
    let resp = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .json(request)
        .send()
        .await
        .map_err(|e| ChatError::connect(url, e))?;

    if !resp.status().is_success() {
        return Err(ChatError::Http {
            status: resp.status().as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| ChatError::connect(url, e))?;
    let body: ChatReply = serde_json::from_slice(&bytes).map_err(|e| ChatError::Json {
        detail: e.to_string(),
    })?;
    body.reply.ok_or(ChatError::MissingReply)
}
