//! Welcome banner display for chat sessions.

use std::io::{self, Write};
use std::path::Path;

use chatvault_core::LoadOutcome;
use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the user id, where the slot lives and how loading went.
pub fn print_welcome_banner(
    out: &mut impl Write,
    user_id: &str,
    slot_dir: &Path,
    outcome: LoadOutcome,
) -> io::Result<()> {
    let status = match outcome {
        LoadOutcome::Fresh => style("new session".to_string()).green(),
        LoadOutcome::Restored { history_len } => {
            style(format!("restored, {history_len} earlier exchanges")).green()
        }
        LoadOutcome::Recovered(kind) => {
            style(format!("saved context unreadable ({kind}), starting empty")).yellow()
        }
    };

    writeln!(out)?;
    writeln!(out, "  * {}", style("chatvault").cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "  {}     {}", style("User:").bold(), style(user_id).dim())?;
    writeln!(out, "  {}  {}", style("Storage:").bold(), style(slot_dir.display()).dim())?;
    writeln!(out, "  {}  {}", style("Context:").bold(), status)?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Type 'exit' to terminate or 'save' to save context manually, /help for more").dim()
    )?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)
}
