//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the session instead of being submitted
//! as a question.

use crate::types::Locale;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// List the recent history entries.
    History,

    /// Load the history entry with this 1-based number into the transcript.
    Load(usize),

    /// Switch to the given locale.
    Locale(Locale),

    /// Switch to the other locale.
    ToggleLocale,

    /// Fetch the history list again.
    Refresh,

    /// Show the whole transcript again.
    Transcript,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be submitted as a question.
///
/// # Examples
///
/// ```
/// # use ragchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/load 2").is_some());
/// assert!(parse_command("What is your experience?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "history" | "h" => ChatCommand::History,
        "load" => match argument {
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => ChatCommand::Load(n),
                _ => ChatCommand::Invalid("/load expects an entry number from /history".to_string()),
            },
            None => ChatCommand::Invalid("/load requires an entry number".to_string()),
        },
        "locale" | "lang" => match argument {
            Some(arg) => match arg.parse::<Locale>() {
                Ok(locale) => ChatCommand::Locale(locale),
                Err(err) => ChatCommand::Invalid(format!("/locale: {err}")),
            },
            None => ChatCommand::ToggleLocale,
        },
        "refresh" => ChatCommand::Refresh,
        "transcript" => ChatCommand::Transcript,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /history               List recent questions
  /load <n>              Replace the conversation with history entry n
  /locale [tr|en]        Set the answer language (no argument toggles)
  /refresh               Fetch the history list again
  /transcript            Show the whole conversation again
  /help                  Show this help message
  /quit                  Exit the chat"#
}
