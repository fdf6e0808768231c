//! Main chat loop orchestration.
//!
//! Reads lines until the user exits, the input ends, or a termination
//! signal closes the session from outside. Session commands go straight to
//! the controller; everything else is interpreted, answered and recorded.

use std::io::{self, Write};

use console::style;

use chatvault_core::session::interpret::{Interpreter, update_for_turn};
use chatvault_types::error::ContextError;

use crate::state::SessionManager;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, ChatOutput, InputEvent};

/// How the chat loop ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The loop terminated the session itself; carries the final save result.
    Exited(Result<(), ContextError>),
    /// The session was closed from outside (termination signal).
    Signalled,
}

/// What the loop should do after one line.
#[derive(Debug)]
pub enum Flow {
    Continue,
    End(SessionEnd),
}

/// Run the interactive loop until the session ends.
pub async fn run_chat_loop<I: Interpreter>(
    manager: &SessionManager,
    interpreter: &I,
    input: &mut ChatInput,
    out: &mut ChatOutput,
) -> anyhow::Result<SessionEnd> {
    let shutdown = manager.shutdown_token();

    loop {
        let event = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(SessionEnd::Signalled),
            event = input.read_line() => event,
        };

        let flow = match event {
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style("Goodbye!").dim())?;
                finish(manager, out).await?
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style("Program terminated. Saving context...").dim())?;
                finish(manager, out).await?
            }
            InputEvent::Message(text) => handle_line(manager, interpreter, &text, out).await?,
        };

        if let Flow::End(end) = flow {
            return Ok(end);
        }
    }
}

/// Handle one submitted line.
pub async fn handle_line<I: Interpreter>(
    manager: &SessionManager,
    interpreter: &I,
    text: &str,
    out: &mut impl Write,
) -> io::Result<Flow> {
    if text.is_empty() {
        return Ok(Flow::Continue);
    }

    let Some(command) = commands::parse(text) else {
        let interpretation = interpreter.interpret(text);
        return match manager.update(update_for_turn(text, &interpretation)).await {
            Ok(()) => {
                writeln!(out, "  {}", interpretation.response)?;
                Ok(Flow::Continue)
            }
            Err(ContextError::SessionClosed) => Ok(Flow::End(SessionEnd::Signalled)),
            Err(e) => {
                writeln!(out, "  {} Could not record that: {e}", style("!").red().bold())?;
                Ok(Flow::Continue)
            }
        };
    };

    match command {
        ChatCommand::Exit => {
            writeln!(out, "  {}", style("Goodbye!").dim())?;
            finish(manager, out).await
        }
        ChatCommand::Save => {
            match manager.save().await {
                Ok(()) => writeln!(out, "  {}", style("Context saved.").green())?,
                Err(ContextError::SessionClosed) => return Ok(Flow::End(SessionEnd::Signalled)),
                Err(e) => writeln!(out, "  {} Could not save context: {e}", style("!").red().bold())?,
            }
            Ok(Flow::Continue)
        }
        ChatCommand::Summary => {
            let summary = manager.summary().await;
            let or_none = |v: Option<String>| v.unwrap_or_else(|| "none".to_string());
            writeln!(out)?;
            writeln!(out, "  {}  {}", style("Current topic:").bold(), or_none(summary.current_topic))?;
            writeln!(out, "  {}    {}", style("Last intent:").bold(), or_none(summary.last_intent))?;
            writeln!(out, "  {}    {}", style("Last entity:").bold(), or_none(summary.last_entity))?;
            writeln!(out, "  {}      {}", style("Exchanges:").bold(), summary.history_len)?;
            writeln!(out)?;
            Ok(Flow::Continue)
        }
        ChatCommand::Clear => {
            match manager.clear().await {
                Ok(()) => writeln!(out, "  {}", style("Context cleared.").dim())?,
                Err(ContextError::SessionClosed) => return Ok(Flow::End(SessionEnd::Signalled)),
                Err(e) => writeln!(out, "  {} Could not clear context: {e}", style("!").red().bold())?,
            }
            Ok(Flow::Continue)
        }
        ChatCommand::History => {
            let history = manager.history().await;
            writeln!(out)?;
            if history.is_empty() {
                writeln!(out, "  {}", style("No messages in this session yet.").dim())?;
            }
            for entry in &history {
                writeln!(out, "  {} {}", style("You:").bold(), entry.input)?;
                writeln!(out, "  {} {}", style("Bot:").cyan().bold(), entry.response)?;
            }
            writeln!(out)?;
            Ok(Flow::Continue)
        }
        ChatCommand::Help => {
            commands::print_help(out)?;
            Ok(Flow::Continue)
        }
    }
}

/// Terminate the session and report the final save.
async fn finish(manager: &SessionManager, out: &mut impl Write) -> io::Result<Flow> {
    let result = manager.terminate().await;
    match &result {
        Ok(()) => writeln!(
            out,
            "  {}",
            style(format!("Context for user {} saved.", manager.user_id())).dim()
        )?,
        // Already closed by the signal handler, which reports on its own.
        Err(ContextError::SessionClosed) => return Ok(Flow::End(SessionEnd::Signalled)),
        Err(e) => writeln!(out, "  {} Could not save context: {e}", style("!").red().bold())?,
    }
    Ok(Flow::End(SessionEnd::Exited(result)))
}
