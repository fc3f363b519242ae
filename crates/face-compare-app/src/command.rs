//! Line-oriented shell command parsing.

use face_compare_core::{CoreError, Role};
use thiserror::Error;

/// Help text printed by the `help` command.
pub const HELP_TEXT: &str = "\
commands:
  before <path>          select the before image
  after <path>           select the after image
  clear <before|after>   empty one slot
  submit                 compare the selected pair
  reset                  clear everything and start over
  status                 show the current state
  health                 probe the comparison service
  help                   show this text
  quit                   leave the shell";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    /// Load a file into a slot.
    Select {
        /// Target slot.
        role: Role,
        /// Path as typed, surrounding quotes removed.
        path: String,
    },
    /// Empty one slot.
    Clear(Role),
    /// Start a comparison.
    Submit,
    /// Return to the initial state.
    Reset,
    /// Print the display state.
    Status,
    /// Probe the service health endpoint.
    Health,
    /// Print help.
    Help,
    /// Leave the shell.
    Quit,
}

impl ShellCommand {
    /// Parses one input line.
    ///
    /// The path argument is the remainder of the line, so paths containing
    /// spaces need no quoting.
    ///
    /// # Errors
    /// Returns [`CommandError`] for unknown verbs, missing arguments, and
    /// unknown slot names.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Empty,
            "before" | "after" => {
                let role = verb.parse::<Role>()?;
                let path = unquote(rest);
                if path.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: role.as_str(),
                        argument: "path",
                    });
                }
                ShellCommand::Select {
                    role,
                    path: path.to_string(),
                }
            }
            "clear" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "clear",
                        argument: "before|after",
                    });
                }
                ShellCommand::Clear(rest.parse::<Role>()?)
            }
            "submit" | "compare" => ShellCommand::Submit,
            "reset" => ShellCommand::Reset,
            "status" => ShellCommand::Status,
            "health" => ShellCommand::Health,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            _ => return Err(CommandError::Unknown(verb.to_string())),
        };
        Ok(command)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|value| value.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Shell parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Verb is not recognised.
    #[error("unknown command '{0}', type `help`")]
    Unknown(String),
    /// Required argument is missing.
    #[error("`{command}` needs a {argument} argument")]
    MissingArgument {
        /// Command verb.
        command: &'static str,
        /// Argument description.
        argument: &'static str,
    },
    /// Slot name is invalid.
    #[error(transparent)]
    Role(#[from] CoreError),
}
