//! Lessonbook: render tutorial lessons from markdown templates.
//!
//! This is the main entry point for the `lessonbook` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and handles
//! errors with proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod context;
pub mod embed;
pub mod error;
pub mod eval;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod lesson;
pub mod markers;
pub mod nix;
pub mod render;
pub mod rewrite;
pub mod sandbox;
pub mod selfeval;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
