//! Session command parsing for the chat loop.
//!
//! A line that is exactly one of the command words (case-insensitive, with
//! or without a leading `/`) controls the session. Anything else is
//! conversation and goes to the interpreter.

use std::io::{self, Write};

use console::style;

/// Commands understood by the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Save and end the session.
    Exit,
    /// Save the context now.
    Save,
    /// Show topic, last intent, last entity and history size.
    Summary,
    /// Forget everything recorded for this user.
    Clear,
    /// Show the recorded exchanges.
    History,
    /// Show available commands.
    Help,
}

/// Parse user input as a session command.
///
/// Returns `None` if the input is conversation.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim().to_lowercase();
    let word = trimmed.strip_prefix('/').unwrap_or(trimmed.as_str());

    match word {
        "exit" | "quit" => Some(ChatCommand::Exit),
        "save" => Some(ChatCommand::Save),
        "summary" => Some(ChatCommand::Summary),
        "clear" => Some(ChatCommand::Clear),
        "history" => Some(ChatCommand::History),
        "help" if trimmed.starts_with('/') => Some(ChatCommand::Help),
        _ => None,
    }
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    writeln!(out, "  {}     Save the context and quit", style("exit").cyan())?;
    writeln!(out, "  {}     Save the context now", style("save").cyan())?;
    writeln!(out, "  {}  Show what the bot remembers", style("summary").cyan())?;
    writeln!(out, "  {}    Forget this session's context", style("clear").cyan())?;
    writeln!(out, "  {}  Show the conversation so far", style("history").cyan())?;
    writeln!(out, "  {}    Show this help message", style("/help").cyan())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Ctrl+D or Ctrl+C save and exit").dim()
    )?;
    writeln!(out)
}
