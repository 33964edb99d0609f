//! Implementation of the `filegate semaphore` and `filegate status` commands.

use super::run_child;
use crate::cli::{SemaphoreArgs, StatusArgs};
use filegate::config::Config;
use filegate::error::{LockError, Result};
use filegate::exit_codes;
use filegate::semaphore::SlotStatus;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Execute the `filegate semaphore` command.
pub fn cmd_semaphore(args: SemaphoreArgs, config: &Config) -> Result<i32> {
    let merged = Config {
        timeout: args.timeout.or(config.timeout),
        check_interval: args.check_interval.unwrap_or(config.check_interval),
        semaphore_directory: args
            .directory
            .or_else(|| config.semaphore_directory.clone()),
        ..config.clone()
    };

    let mut semaphore = merged.semaphore(&args.name, args.maximum)?;
    semaphore.with_permit(|permit| {
        debug!(slot = permit.index, path = %permit.path.display(), "running under permit");
        run_child(&args.command)
    })?
}

/// Slot occupancy of one semaphore.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub name: String,
    pub maximum: usize,
    pub directory: PathBuf,
    pub busy: usize,
    pub slots: Vec<SlotStatus>,
}

/// Probe every slot of the named semaphore.
pub fn status_report(args: &StatusArgs, config: &Config) -> Result<StatusReport> {
    let merged = Config {
        semaphore_directory: args
            .directory
            .clone()
            .or_else(|| config.semaphore_directory.clone()),
        ..config.clone()
    };

    let semaphore = merged.semaphore(&args.name, args.maximum)?;
    let slots = semaphore.probe()?;

    Ok(StatusReport {
        name: args.name.clone(),
        maximum: args.maximum,
        directory: semaphore.lock_directory().to_path_buf(),
        busy: slots.iter().filter(|slot| slot.busy).count(),
        slots,
    })
}

/// Execute the `filegate status` command.
pub fn cmd_status(args: StatusArgs, config: &Config) -> Result<i32> {
    let report = status_report(&args, config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| LockError::Usage(format!("failed to serialize status: {}", e)))?;
        println!("{}", json);
        return Ok(exit_codes::SUCCESS);
    }

    println!("Semaphore '{}'", report.name);
    println!("  directory: {}", report.directory.display());
    println!("  busy:      {}/{}", report.busy, report.maximum);
    println!();
    for slot in &report.slots {
        let state = if slot.busy { "busy" } else { "free" };
        println!("  {:>3}  {:4}  {}", slot.index, state, slot.path.display());
    }

    Ok(exit_codes::SUCCESS)
}
