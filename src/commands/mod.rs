//! Command implementations for filegate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Commands return the process exit code on success so a
//! child command's own code can pass through.

mod lock;
mod semaphore;
mod write;


use crate::cli::Command;
use filegate::config::Config;
use filegate::error::{LockError, Result};
use filegate::exit_codes;
use std::process::Command as ProcessCommand;
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command, config: &Config) -> Result<i32> {
    match command {
        Command::Lock(args) => lock::cmd_lock(args, config),
        Command::Semaphore(args) => semaphore::cmd_semaphore(args, config),
        Command::Status(args) => semaphore::cmd_status(args, config),
        Command::Write(args) => write::cmd_write(args),
    }
}

/// Run a child command and return its exit code.
///
/// A child killed by a signal has no exit code and maps to `USER_ERROR`.
pub(crate) fn run_child(command: &[String]) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| LockError::Usage("no command given".to_string()))?;

    debug!(program = %program, "running command");
    let status = ProcessCommand::new(program)
        .args(args)
        .status()
        .map_err(|e| LockError::resource(format!("failed to execute '{}'", program), e))?;

    Ok(status.code().unwrap_or(exit_codes::USER_ERROR))
}
