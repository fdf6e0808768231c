//! chatvault entry point.
//!
//! Binary name: `chatvault`
//!
//! Parses CLI arguments, resolves the encryption key and storage, loads the
//! user's session context, then runs the chat loop. Ctrl+C and SIGTERM
//! terminate the session (saving it) instead of killing the process.

mod cli;
mod interpreter;
mod signal;
mod state;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap_complete::generate;
use secrecy::SecretString;

use chatvault_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::chat::banner::print_welcome_banner;
use cli::chat::input::ChatInput;
use cli::chat::loop_runner::{SessionEnd, run_chat_loop};
use cli::{Cli, Commands};
use interpreter::KeywordInterpreter;
use state::{AppState, StartupOptions};

/// Longest a termination signal waits for the session lock and final save.
const SIGNAL_SAVE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Shell completions don't need a session
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatvault", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chatvault=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let state = AppState::init(StartupOptions {
        user_id: cli.user,
        data_dir: cli.data_dir,
        encryption_key: cli.encryption_key.map(SecretString::from),
        passphrase: cli.passphrase.map(SecretString::from),
    })
    .await?;
    let manager = state.manager.clone();

    let outcome = manager.load().await?;

    let (mut input, mut out) = ChatInput::new("> ".to_string())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    print_welcome_banner(&mut out, manager.user_id(), &state.slot_dir, outcome)?;

    let signal_task = tokio::spawn(signal::terminate_on(
        signal::shutdown_signal(),
        manager.clone(),
        out.clone(),
        SIGNAL_SAVE_TIMEOUT,
    ));

    let end = run_chat_loop(&manager, &KeywordInterpreter::new(), &mut input, &mut out).await;
    input.close();

    match end? {
        SessionEnd::Exited(result) => {
            signal_task.abort();
            Ok(if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        // The signal handler owns the final save; wait for its verdict.
        SessionEnd::Signalled => {
            let saved = signal_task.await.unwrap_or(false);
            // Restores the terminal; `exit_now` skips destructors.
            drop(input);
            exit_now(saved)
        }
    }
}

/// Leave without dropping the runtime.
///
/// A pending blocking read on piped stdin keeps the runtime from shutting
/// down, so after a signal the process exits directly once the session is
/// saved.
fn exit_now(saved: bool) -> ! {
    shutdown_tracing();
    std::process::exit(if saved { 0 } else { 1 })
}
