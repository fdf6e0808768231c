//! Async line input and output for the chat loop.
//!
//! On a terminal, wraps `rustyline_async::Readline` to provide async line
//! reading with proper handling of EOF (Ctrl+D) and interrupt (Ctrl+C).
//! When stdin is not a terminal, lines are read from it as plain text so
//! the bot can be scripted.

use std::io::{self, IsTerminal, Write};

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Events produced by the input handler.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// User submitted a line (trimmed, possibly empty).
    Message(String),
    /// End of file (Ctrl+D or closed stdin).
    Eof,
    /// Interrupt (Ctrl+C while the prompt owns the terminal).
    Interrupted,
}

/// Async input handler.
pub enum ChatInput {
    Terminal(Readline),
    Piped(Lines<BufReader<Stdin>>),
}

impl ChatInput {
    /// Create the input handler with the given prompt.
    ///
    /// Returns the input handler and a [`ChatOutput`] that prints without
    /// interfering with the readline prompt.
    pub fn new(prompt: String) -> Result<(Self, ChatOutput), ReadlineError> {
        if io::stdin().is_terminal() {
            let (rl, stdout) = Readline::new(prompt)?;
            Ok((ChatInput::Terminal(rl), ChatOutput::Terminal(stdout)))
        } else {
            let lines = BufReader::new(tokio::io::stdin()).lines();
            Ok((ChatInput::Piped(lines), ChatOutput::Plain))
        }
    }

    /// Read a line of input.
    ///
    /// Cancel-safe, so it can race a shutdown signal in `select!`.
    pub async fn read_line(&mut self) -> InputEvent {
        match self {
            ChatInput::Terminal(rl) => match rl.readline().await {
                Ok(ReadlineEvent::Line(line)) => {
                    let trimmed = line.trim().to_string();
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed.clone());
                    }
                    InputEvent::Message(trimmed)
                }
                Ok(ReadlineEvent::Eof) => InputEvent::Eof,
                Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
                Err(_) => InputEvent::Eof,
            },
            ChatInput::Piped(lines) => match lines.next_line().await {
                Ok(Some(line)) => InputEvent::Message(line.trim().to_string()),
                Ok(None) | Err(_) => InputEvent::Eof,
            },
        }
    }

    /// Restore the terminal before the process exits.
    pub fn close(&mut self) {
        if let ChatInput::Terminal(rl) = self {
            let _ = rl.flush();
        }
    }
}

/// Where chat output goes. Cheap to clone, so the signal handler can report
/// through the same channel as the loop.
#[derive(Clone)]
pub enum ChatOutput {
    Terminal(SharedWriter),
    Plain,
}

impl Write for ChatOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ChatOutput::Terminal(writer) => writer.write(buf),
            ChatOutput::Plain => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ChatOutput::Terminal(writer) => writer.flush(),
            ChatOutput::Plain => io::stdout().flush(),
        }
    }
}
