//! Operator commands typed at the host console.

/// Every command the console understands, with its help text.
pub const COMMANDS: &[(&str, &str)] = &[
    ("reloadreporter", "Reload the reporting plugin settings"),
    ("join <name>", "Simulate a player joining"),
    ("leave <name>", "Simulate a player leaving"),
    ("report", "Queue a report for the current status"),
    ("status", "Show the reporter state and roster"),
    ("help", "List commands"),
    ("quit", "Stop the reporter and exit"),
];

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Stop, reload settings, start.
    ReloadReporter,
    /// A player joined.
    Join(String),
    /// A player left.
    Leave(String),
    /// Queue a report now.
    Report,
    /// Print state and roster.
    Status,
    /// Print [`COMMANDS`].
    Help,
    /// Exit.
    Quit,
}

/// Why a console line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line was blank.
    #[error("empty command")]
    Empty,
    /// No such command.
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    /// The command needs an argument.
    #[error("'{0}' needs a player name")]
    MissingArgument(&'static str),
}

impl OperatorCommand {
    /// Parse one console line. Command names are case-insensitive; the
    /// argument is everything after the first space, trimmed.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let player = |command: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingArgument(command))
            } else {
                Ok(arg.to_string())
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "reloadreporter" => Ok(Self::ReloadReporter),
            "join" => player("join").map(Self::Join),
            "leave" => player("leave").map(Self::Leave),
            "report" => Ok(Self::Report),
            "status" => Ok(Self::Status),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}
