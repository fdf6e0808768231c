//! Interactive chat session for chatvault.
//!
//! This module implements the read-interpret-update loop: welcome banner,
//! line input, the `exit` / `save` / `summary` / `clear` / `history`
//! commands, and everything else routed through the interpreter.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
