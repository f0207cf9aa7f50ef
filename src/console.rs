//! Terminal front end: slash-command dispatch, event rendering, and the
//! line-reading input loop.
//!
//! Everything here writes to caller-supplied `std::io::Write` sinks so the
//! binary can hand in stdout/stderr and tests can hand in byte buffers.
//! Transcript lines go to `out`; status lines (typing indicator, command
//! feedback) go to `status`.

use std::io::{self, Write};

use colored::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::command::{Command, HELP};
use crate::composer::{Composer, KeyOutcome};
use crate::message::{Message, Sender};
use crate::session::{ChatSession, SendOutcome, SessionEvent};

/// How [`run_input`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// `/quit` was entered. Sends still in flight are abandoned.
    Quit,
    /// Input ran out. Every send has finished by the time this is returned.
    Eof,
}

/// Read lines from `input` until `/quit` or end of input.
///
/// Commands are only recognised at the start of a fresh message. A message
/// left open by a continuation line when input ends is sent as it stands.
pub async fn run_input<R>(
    input: R,
    session: &ChatSession,
    status: &mut impl Write,
) -> io::Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut composer = Composer::new();
    let mut in_flight: Vec<JoinHandle<SendOutcome>> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if composer.as_str().is_empty() {
            if let Some(cmd) = Command::parse(&line) {
                if !run_command(cmd, session, status)? {
                    return Ok(Exit::Quit);
                }
                continue;
            }
        }

        if composer.push_line(&line) == KeyOutcome::Submit {
            match session.submit_input(&mut composer) {
                Some(handle) => in_flight.push(handle),
                // Blank input: start the next message from scratch.
                None => {
                    composer.take();
                }
            }
        }
        in_flight.retain(|handle| !handle.is_finished());
    }

    if !composer.is_blank() {
        let buffer = composer.take();
        // The dangling newline came from a continuation with no next line.
        let text = buffer.strip_suffix('\n').unwrap_or(buffer.as_str());
        debug!(chars = text.len(), "input ended mid-message, sending it");
        in_flight.extend(session.submit(text));
    }

    for handle in in_flight {
        if let Err(e) = handle.await {
            debug!(error = %e, "send task ended without an outcome");
        }
    }
    Ok(Exit::Eof)
}

/// Execute one slash command. Returns `Ok(false)` when input should stop.
pub fn run_command(
    cmd: Command,
    session: &ChatSession,
    status: &mut impl Write,
) -> io::Result<bool> {
    match cmd {
        Command::Quit => return Ok(false),
        Command::Clear => session.clear(),
        Command::Save(path) => match session.transcript().save(&path) {
            Ok(()) => writeln!(
                status,
                "{}",
                format!("  saved to {}", path.display()).bright_green()
            )?,
            Err(e) => writeln!(status, "{} {}", "  save failed:".bright_red(), e)?,
        },
        Command::Endpoint => {
            let endpoint = session.endpoint();
            let state = if endpoint.is_resolved() { "resolved" } else { "fallback" };
            writeln!(status, "  {} ({})", endpoint.current().bright_white(), state)?;
        }
        Command::Help => writeln!(status, "{}", HELP)?,
        Command::Invalid(input) => {
            writeln!(status, "{} {}", "  unknown command:".bright_red(), input)?;
        }
    }
    Ok(true)
}

/// Draw one session event.
pub fn render_event(
    event: &SessionEvent,
    bot_name: &str,
    out: &mut impl Write,
    status: &mut impl Write,
) -> io::Result<()> {
    match event {
        SessionEvent::Appended(message) => writeln!(out, "{}", paint(message, bot_name))?,
        // Clear screen and home the cursor.
        SessionEvent::Cleared => write!(out, "\x1B[2J\x1B[H")?,
        SessionEvent::Pending(true) => {
            writeln!(status, "{}", format!("  {bot_name} is typing…").dimmed())?;
        }
        SessionEvent::Pending(false) => {}
    }
    out.flush()
}

/// Draw events until every sender of the channel is gone, then hand the
/// writers back.
pub async fn render_events<O, S>(
    mut rx: broadcast::Receiver<SessionEvent>,
    bot_name: String,
    mut out: O,
    mut status: S,
) -> (O, S)
where
    O: Write,
    S: Write,
{
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Err(e) = render_event(&event, &bot_name, &mut out, &mut status) {
                    debug!(error = %e, "output closed, renderer stopping");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "renderer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    (out, status)
}

/// A transcript line with its sender prefix and colour.
pub fn paint(message: &Message, bot_name: &str) -> ColoredString {
    let line = message.render(bot_name);
    match message.sender() {
        Sender::User => line.bright_magenta(),
        Sender::Bot => line.bright_white().on_purple(),
    }
}
