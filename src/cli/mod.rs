//! CLI argument parsing for filegate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Filegate: cooperative cross-process locks on the filesystem.
///
/// Runs commands under an advisory file lock or a bounded semaphore made of
/// lock files, and writes files atomically.
#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML file with lock and semaphore defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log lock attempts and releases to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for filegate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a file lock.
    ///
    /// Exits with the command's exit code, or 4 when the lock could not be
    /// acquired.
    Lock(LockArgs),

    /// Run a command while holding one permit of a bounded semaphore.
    Semaphore(SemaphoreArgs),

    /// Show which permits of a semaphore are busy.
    ///
    /// Each slot is probed without waiting and released immediately.
    Status(StatusArgs),

    /// Copy stdin to a new file atomically.
    ///
    /// Fails if the file already exists; readers never see partial content.
    Write(WriteArgs),
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Lock file path.
    pub path: PathBuf,

    /// Seconds to wait for the lock (0 tries once).
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Seconds between attempts while waiting.
    #[arg(long)]
    pub check_interval: Option<f64>,

    /// Fail immediately if the lock is held.
    #[arg(long)]
    pub fail_when_locked: bool,

    /// Take a shared lock instead of an exclusive one.
    #[arg(long)]
    pub shared: bool,

    /// Open mode of the lock file (a, w, r+, ...).
    #[arg(long)]
    pub mode: Option<String>,

    /// Command to run, after `--`.
    #[arg(last = true, required = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// Arguments for the `semaphore` command.
#[derive(Parser, Debug)]
pub struct SemaphoreArgs {
    /// Semaphore name, used in permit filenames.
    pub name: String,

    /// Number of permits.
    #[arg(short, long)]
    pub maximum: usize,

    /// Directory of the permit files.
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Seconds to wait for a permit (0 tries once).
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Seconds between passes while waiting.
    #[arg(long)]
    pub check_interval: Option<f64>,

    /// Command to run, after `--`.
    #[arg(last = true, required = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Semaphore name.
    pub name: String,

    /// Number of permits.
    #[arg(short, long)]
    pub maximum: usize,

    /// Directory of the permit files.
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `write` command.
#[derive(Parser, Debug)]
pub struct WriteArgs {
    /// File to create.
    pub path: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
