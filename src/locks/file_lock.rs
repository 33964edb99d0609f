//! Single-holder file lock with timeout, polling and fail-fast policy.
//!
//! # Acquisition
//!
//! 1. Open the file with the configured mode (never truncating at open)
//! 2. Attempt the advisory lock; the first attempt always happens, so a zero
//!    timeout means "try once"
//! 3. On contention either fail immediately (`fail_when_locked`) or sleep
//!    `check_interval` and retry until the monotonic deadline
//! 4. Once locked, truncate if the mode asked for it
//!
//! Every failure path drops the opened handle, so a failed acquisition never
//! leaves a descriptor or a lock behind.

use super::engine::LockEngine;
use super::options::{Acquire, LockOptions, Plan};
use super::primitive::{AdvisoryLock, AttemptError, Flock};
use crate::error::{LockError, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// A lock on one file, held through an open handle.
///
/// Reusable: it can be acquired and released any number of times.
/// Acquiring while already held returns the held handle.
#[derive(Debug)]
pub struct FileLock<P: AdvisoryLock = Flock> {
    options: LockOptions,
    primitive: P,
    handle: Option<File>,
}

impl FileLock {
    /// A lock on `path` with default options.
    pub fn new<T: Into<PathBuf>>(path: T) -> Self {
        Self::with_options(LockOptions::new(path))
    }

    /// A lock with explicit options.
    pub fn with_options(options: LockOptions) -> Self {
        Self::with_primitive(options, Flock)
    }
}

impl<P: AdvisoryLock> FileLock<P> {
    /// A lock using a custom advisory-lock primitive.
    pub fn with_primitive(options: LockOptions, primitive: P) -> Self {
        Self {
            options,
            primitive,
            handle: None,
        }
    }

    /// The configuration of this lock.
    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// The held handle, if any.
    pub fn handle(&self) -> Option<&File> {
        self.handle.as_ref()
    }

    fn open(&self) -> Result<File> {
        self.options
            .build_open_options()
            .open(&self.options.path)
            .map_err(|e| {
                LockError::resource(
                    format!("failed to open lock file '{}'", self.options.path.display()),
                    e,
                )
            })
    }

    /// Attempt the primitive until it succeeds, contention becomes fatal,
    /// or the deadline passes.
    fn wait_for_lock(&self, file: &File, plan: &Plan) -> Result<()> {
        let path = &self.options.path;
        let flags = self.options.flags;
        let start = Instant::now();
        let deadline = start.checked_add(plan.timeout);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let contention = match self.primitive.lock(file, flags) {
                Ok(()) => {
                    debug!(path = %path.display(), attempts, "lock acquired");
                    return Ok(());
                }
                Err(AttemptError::Contended(e)) => e,
                Err(AttemptError::Failed(e)) => {
                    return Err(LockError::resource(
                        format!("failed to lock '{}'", path.display()),
                        e,
                    ));
                }
            };

            if plan.fail_when_locked {
                debug!(path = %path.display(), "lock contended, failing fast");
                return Err(LockError::AlreadyLocked {
                    resource: format!("'{}'", path.display()),
                    source: Some(contention),
                });
            }

            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => {
                    debug!(path = %path.display(), attempts, "lock wait timed out");
                    return Err(LockError::Timeout {
                        path: path.clone(),
                        timeout: plan.timeout,
                        source: Some(contention),
                    });
                }
                Some(deadline) => deadline - now,
                None => plan.check_interval,
            };

            thread::sleep(plan.check_interval.min(remaining));
        }
    }

    fn truncate(&self, file: &mut File) -> Result<()> {
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.set_len(0))
            .map_err(|e| {
                LockError::resource(
                    format!("failed to truncate '{}'", self.options.path.display()),
                    e,
                )
            })
    }
}

impl<P: AdvisoryLock> LockEngine for FileLock<P> {
    fn path(&self) -> &Path {
        &self.options.path
    }

    fn is_locked(&self) -> bool {
        self.handle.is_some()
    }

    fn handle_mut(&mut self) -> Option<&mut File> {
        self.handle.as_mut()
    }

    fn acquire_with(&mut self, overrides: &Acquire) -> Result<&mut File> {
        if self.handle.is_some() {
            return self
                .handle
                .as_mut()
                .ok_or_else(|| super::engine::missing_handle(&self.options.path));
        }

        self.options.validate()?;
        let plan = self.options.resolve(overrides);
        for warning in super::options::LockWarning::check(self.options.flags, plan.timeout) {
            warn!(path = %self.options.path.display(), "{}", warning);
        }

        let mut file = self.open()?;
        self.wait_for_lock(&file, &plan)?;

        // Only now that the lock is held may existing content be destroyed.
        if self.options.mode.truncate_after_lock()
            && let Err(e) = self.truncate(&mut file)
        {
            let _ = self.primitive.unlock(&file);
            return Err(e);
        }

        Ok(self.handle.insert(file))
    }

    fn release(&mut self) -> Result<()> {
        let Some(file) = self.handle.take() else {
            return Ok(());
        };

        let unlocked = self.primitive.unlock(&file);
        drop(file);
        debug!(path = %self.options.path.display(), "lock released");

        unlocked.map_err(|e| {
            LockError::resource(
                format!("failed to unlock '{}'", self.options.path.display()),
                e,
            )
        })
    }
}

impl<P: AdvisoryLock> Drop for FileLock<P> {
    fn drop(&mut self) {
        if self.handle.is_some()
            && let Err(e) = self.release()
        {
            warn!(error = %e, "failed to release lock on drop");
        }
    }
}
