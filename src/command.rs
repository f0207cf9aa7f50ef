//! Slash commands understood by the terminal front end.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Save(PathBuf),
    Endpoint,
    Help,
    Quit,
    /// A `/word` that is not a known command, or a known one missing its
    /// argument. Carries the offending input for the error message.
    Invalid(String),
}

impl Command {
    /// Interpret `line` as a command. Lines that do not start with `/` are
    /// chat input and yield `None`.
    pub fn parse(line: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let cmd = match name {
            "clear" => Command::Clear,
            "save" if !arg.is_empty() => Command::Save(PathBuf::from(arg)),
            "endpoint" => Command::Endpoint,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Invalid(line.trim().to_string()),
        };
        Some(cmd)
    }
}

pub const HELP: &str = "\
Commands:
  /clear          clear the conversation
  /save <path>    write the conversation to a JSON file
  /endpoint       show the chat URL in use
  /help           show this list
  /quit           leave (Ctrl+D also works)
End a line with \\ to continue the message on the next line.";
