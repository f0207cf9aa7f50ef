//! Terminal chat client for the HossBot backend.
//!
//! The backend is reachable either directly on the local network or through
//! an SSH tunnel. [`endpoint::EndpointResolver`] probes the local address once
//! at startup and picks one; [`session::ChatSession`] keeps the transcript and
//! runs each question/reply exchange against whichever address is active.

pub mod cli;
pub mod command;
pub mod composer;
pub mod console;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod protocol;
pub mod session;
pub mod transcript;

pub use config::ChatConfig;
pub use endpoint::{ActiveEndpoint, EndpointResolver, Route};
pub use error::ChatError;
pub use message::{Message, Sender};
pub use session::{ChatSession, SendOutcome, SessionEvent, SessionId};
pub use transcript::Transcript;
