//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Defaults for locks and semaphores created by the CLI.
///
/// Durations are in seconds. Unknown fields in the YAML are ignored for
/// forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// How long to wait for a contended lock. `null` means one attempt.
    #[serde(default = "default_timeout")]
    pub timeout: Option<f64>,

    /// Pause between attempts while waiting.
    #[serde(default = "default_check_interval")]
    pub check_interval: f64,

    /// Report contention immediately instead of waiting.
    #[serde(default)]
    pub fail_when_locked: bool,

    /// Open mode of lock files (`"a"`, `"w"`, `"r+"`...).
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Take shared instead of exclusive locks.
    #[serde(default)]
    pub shared: bool,

    /// Let the OS call block. The timeout then has no effect.
    #[serde(default)]
    pub blocking: bool,

    // =========================================================================
    // Semaphore settings
    // =========================================================================
    /// Directory for permit files (default: system temp directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semaphore_directory: Option<PathBuf>,

    /// Permit filename pattern with `{name}` and `{number}` placeholders.
    #[serde(default = "default_filename_pattern")]
    pub filename_pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            check_interval: default_check_interval(),
            fail_when_locked: false,
            mode: default_mode(),
            shared: false,
            blocking: false,
            semaphore_directory: None,
            filename_pattern: default_filename_pattern(),
        }
    }
}
