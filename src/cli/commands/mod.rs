//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads what it needs through the [`Context`]
//! 2. Calls into [`crate::codegen`] or [`crate::artifact`]
//! 3. Formats and displays output
//!
//! Handlers never write files themselves.

mod completion;
mod config_cmd;
mod generate;
mod keys;
mod slots;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::config;
pub use generate::{check, generate};
pub use keys::keys;
pub use slots::slots;

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::types::Mode;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Generate { test, check } => {
            generate::generate(ctx, Mode::from_test_flag(test), check)
        }
        Command::Check { test } => generate::check(ctx, Mode::from_test_flag(test)),
        Command::Keys { test, json } => keys::keys(ctx, Mode::from_test_flag(test), json),
        Command::Slots { test } => slots::slots(ctx, Mode::from_test_flag(test)),
        Command::Config => config_cmd::config(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}
