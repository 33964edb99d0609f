//! Lock configuration and per-call overrides.

use super::flags::LockFlags;
use crate::error::Result;
use crate::fs::OpenMode;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time to wait for a contended lock.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default pause between attempts while waiting.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration of a single lock file.
///
/// Fixed once acquisition starts. A `timeout` of `None` means a single
/// attempt, exactly like `Some(Duration::ZERO)`.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Path of the lock file.
    pub path: PathBuf,

    /// How the file is opened. A `w` mode truncates only after locking.
    pub mode: OpenMode,

    /// How long to keep retrying on contention.
    pub timeout: Option<Duration>,

    /// Pause between attempts.
    pub check_interval: Duration,

    /// Report contention immediately instead of waiting.
    pub fail_when_locked: bool,

    /// Exclusive/shared and blocking/non-blocking mode.
    pub flags: LockFlags,

    /// Replaces the options derived from `mode` when set. Truncation at open
    /// is always disabled.
    pub open_options: Option<OpenOptions>,
}

impl LockOptions {
    /// Options with the defaults: append mode, 5s timeout, 250ms interval,
    /// waiting on contention, exclusive non-blocking flags.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            mode: OpenMode::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            check_interval: DEFAULT_CHECK_INTERVAL,
            fail_when_locked: false,
            flags: LockFlags::default(),
            open_options: None,
        }
    }

    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn fail_when_locked(mut self, fail: bool) -> Self {
        self.fail_when_locked = fail;
        self
    }

    pub fn flags(mut self, flags: LockFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Pass custom open options (permissions, custom flags...).
    pub fn open_options(mut self, options: OpenOptions) -> Self {
        self.open_options = Some(options);
        self
    }

    /// The path of the lock file.
    pub fn lock_path(&self) -> &Path {
        &self.path
    }

    /// Check the flag combination.
    pub fn validate(&self) -> Result<()> {
        self.flags.validate()
    }

    /// Configuration warnings for the instance defaults.
    pub fn warnings(&self) -> Vec<LockWarning> {
        LockWarning::check(self.flags, self.timeout.unwrap_or(Duration::ZERO))
    }

    pub(crate) fn build_open_options(&self) -> OpenOptions {
        match &self.open_options {
            Some(custom) => {
                let mut options = custom.clone();
                options.truncate(false);
                options
            }
            None => self.mode.options(),
        }
    }

    /// Merge per-call overrides with the instance defaults.
    pub(crate) fn resolve(&self, overrides: &Acquire) -> Plan {
        Plan {
            timeout: overrides
                .timeout
                .or(self.timeout)
                .unwrap_or(Duration::ZERO),
            check_interval: overrides.check_interval.unwrap_or(self.check_interval),
            fail_when_locked: overrides.fail_when_locked.unwrap_or(self.fail_when_locked),
        }
    }
}

/// Per-call overrides for `acquire_with`. Unset fields use the lock's
/// configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Acquire {
    pub timeout: Option<Duration>,
    pub check_interval: Option<Duration>,
    pub fail_when_locked: Option<bool>,
}

impl Acquire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    pub fn fail_when_locked(mut self, fail: bool) -> Self {
        self.fail_when_locked = Some(fail);
        self
    }
}

/// Fully resolved parameters of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
    pub timeout: Duration,
    pub check_interval: Duration,
    pub fail_when_locked: bool,
}

/// A configuration that is accepted but probably not what the caller meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWarning {
    /// Blocking flags wait inside the OS call, so the timeout has no effect.
    BlockingWithTimeout { timeout: Duration },
}

impl LockWarning {
    pub(crate) fn check(flags: LockFlags, timeout: Duration) -> Vec<LockWarning> {
        let mut warnings = Vec::new();
        if flags.is_blocking() && !timeout.is_zero() {
            warnings.push(LockWarning::BlockingWithTimeout { timeout });
        }
        warnings
    }
}

impl fmt::Display for LockWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockWarning::BlockingWithTimeout { timeout } => write!(
                f,
                "timeout of {:?} has no effect with blocking lock flags; add NON_BLOCKING",
                timeout
            ),
        }
    }
}
