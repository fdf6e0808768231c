//! CLI definitions for the `chatvault` binary.
//!
//! Uses clap derive macros for argument parsing. Running without a
//! subcommand starts the interactive session.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with a bot whose session context survives restarts, encrypted at rest.
#[derive(Parser)]
#[command(name = "chatvault", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// User whose session context is loaded and saved.
    #[arg(short, long, default_value = "user123")]
    pub user: String,

    /// Hex-encoded 32-byte encryption key (prefer the environment variable).
    #[arg(long, env = "CHATVAULT_ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,

    /// Passphrase to derive the encryption key from, if no key is given.
    #[arg(long, env = "CHATVAULT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Directory holding config.toml and the session slots.
    #[arg(long, env = "CHATVAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
