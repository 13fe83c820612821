//! Chat commands.
//!
//! A message whose first character is the command prefix never reaches the
//! pipeline. Matching is exact and case-sensitive; anything else after the
//! prefix is [`Command::Unknown`].

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `obliviate`: forget the conversation history.
    ClearHistory,
    /// `debug`: toggle echoing of internal errors.
    ToggleDebug,
    /// `help`: list the commands.
    Help,
    /// Prefixed text that matches no command, kept verbatim.
    Unknown(String),
}

impl Command {
    /// Parse `text` as a command. Returns `None` when it does not start with `prefix`.
    pub fn parse(text: &str, prefix: char) -> Option<Self> {
        let name = text.strip_prefix(prefix)?;
        Some(match name {
            "obliviate" => Self::ClearHistory,
            "debug" => Self::ToggleDebug,
            "help" => Self::Help,
            _ => Self::Unknown(text.to_string()),
        })
    }
}

/// Reply to `#obliviate`.
pub const CLEARED_REPLY: &str = "**Conversation history cleared**";

/// Reply to `#debug`, reflecting the new state.
pub fn debug_reply(enabled: bool) -> String {
    format!("**Debug mode is {}**", debug_state(enabled))
}

/// The command list with the current debug state.
pub fn command_list(prefix: char, debug: bool) -> String {
    format!(
        "**List of available commands:**\n\
         \x20- **{prefix}obliviate** : clean conversation history\n\
         \x20- **{prefix}debug** : toggle debug mode\n\
         \x20- **{prefix}help** : display this message\n\
         **Information:**\n\
         \x20- Debug mode is {}",
        debug_state(debug)
    )
}

/// Reply to prefixed text that is not a command.
pub fn unknown_reply(text: &str, prefix: char, debug: bool) -> String {
    format!("Sorry {text} is not a command\n\n{}", command_list(prefix, debug))
}

fn debug_state(enabled: bool) -> &'static str {
    if enabled { "activated" } else { "disabled" }
}
