//! Filegate: cooperative cross-process locks on the filesystem.
//!
//! This is the main entry point for the `filegate` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use filegate::config::Config;
use filegate::locks::cleanup;
use filegate::{exit_codes, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Cli {
        config,
        verbose,
        command,
    } = Cli::parse_args();
    logging::init(verbose);

    // Ephemeral lock files left registered are removed when this drops
    let _shutdown = cleanup::install();

    let config = match config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    };
    let result = config.and_then(|config| commands::dispatch(command, &config));

    match result {
        Ok(code) => ExitCode::from(clamp(code)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(clamp(err.exit_code()))
        }
    }
}

fn clamp(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(exit_codes::USER_ERROR as u8)
}
