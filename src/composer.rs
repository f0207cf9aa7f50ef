//! Pending-input buffer.
//!
//! Enter submits; Enter with the line-break modifier inserts a newline. On a
//! plain line-based terminal the modifier is spelled as a trailing backslash.

/// Marks a terminal line as continued rather than submitted.
pub const LINE_CONTINUATION: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    /// `newline_modifier` is true for Shift+Enter.
    Enter { newline_modifier: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The buffer changed (or nothing happened); keep composing.
    Edited,
    /// The user asked to send the buffer.
    Submit,
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    buffer: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Char(c) => {
                self.buffer.push(c);
                KeyOutcome::Edited
            }
            Key::Backspace => {
                self.buffer.pop();
                KeyOutcome::Edited
            }
            Key::Enter { newline_modifier: true } => {
                self.buffer.push('\n');
                KeyOutcome::Edited
            }
            Key::Enter { newline_modifier: false } => KeyOutcome::Submit,
        }
    }

    /// Feed one line read from a terminal (without its line terminator).
    ///
    /// A line ending in [`LINE_CONTINUATION`] is appended with a newline in
    /// place of the backslash and `KeyOutcome::Edited` is returned; any other
    /// line is appended and `KeyOutcome::Submit` is returned.
    pub fn push_line(&mut self, line: &str) -> KeyOutcome {
        match line.strip_suffix(LINE_CONTINUATION) {
            Some(head) => {
                self.buffer.push_str(head);
                self.handle_key(Key::Enter { newline_modifier: true })
            }
            None => {
                self.buffer.push_str(line);
                self.handle_key(Key::Enter { newline_modifier: false })
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Empty the buffer, returning what it held.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
