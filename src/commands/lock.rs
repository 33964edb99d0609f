//! Implementation of the `filegate lock` command.

use super::run_child;
use crate::cli::LockArgs;
use filegate::config::Config;
use filegate::error::Result;
use filegate::locks::{FileLock, LockEngine};

/// Execute the `filegate lock` command.
///
/// Command-line flags override the config defaults; the merged values go
/// through the same validation as a config file.
pub fn cmd_lock(args: LockArgs, config: &Config) -> Result<i32> {
    let merged = Config {
        timeout: args.timeout.or(config.timeout),
        check_interval: args.check_interval.unwrap_or(config.check_interval),
        fail_when_locked: args.fail_when_locked || config.fail_when_locked,
        shared: args.shared || config.shared,
        mode: args.mode.unwrap_or_else(|| config.mode.clone()),
        ..config.clone()
    };

    let mut lock = FileLock::with_options(merged.lock_options(&args.path)?);
    lock.with_lock(|_| run_child(&args.command))?
}
