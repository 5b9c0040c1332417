use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Re-fetch history from the backend
    Refresh,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub keyword: &'static str,
    pub description: &'static str,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            keyword: command.keyword(),
            description: command.description(),
        })
        .collect()
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Refresh => "re-fetch question history from the backend",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn keyword(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input. Commands take no arguments;
/// trailing text is ignored.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let rest = input.strip_prefix('/')?;
    let head = rest.split_whitespace().next()?;

    SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "exit" | "bye" => Some(SlashCommand::Quit),
            "h" => Some(SlashCommand::Help),
            "r" | "reload" => Some(SlashCommand::Refresh),
            _ => None,
        })
}

/// Get help text for all available commands.
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for entry in command_entries() {
        help.push_str(&format!("/{} - {}\n", entry.keyword, entry.description));
    }

    help.push_str("\nAliases: /q for /quit, /h for /help, /r for /refresh.");
    help.push_str("\nPgUp/PgDn page through previous questions; Enter sends.");

    help
}
