//! Lock whose file only exists while it is held.

use super::cleanup::{self, Registration};
use super::engine::LockEngine;
use super::file_lock::FileLock;
use super::options::{Acquire, LockOptions};
use crate::error::Result;
use crate::fs::OpenMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default ephemeral lock file, relative to the current directory.
pub const DEFAULT_EPHEMERAL_PATH: &str = ".lock";

/// A short-lived mutual-exclusion marker.
///
/// Contention fails fast by default, the file is emptied when acquired and
/// deleted when released. The file is registered with
/// [`cleanup`](super::cleanup) from construction until explicit release, so
/// a forgotten lock is removed at shutdown.
#[derive(Debug)]
pub struct EphemeralLock<E: LockEngine = FileLock> {
    inner: E,
    registration: Option<Registration>,
    /// Set once we have held the lock; only then is the file ours to delete.
    owns_file: bool,
}

impl EphemeralLock {
    /// An ephemeral lock on `path`.
    pub fn new<T: Into<PathBuf>>(path: T) -> Self {
        Self::with_options(Self::default_options(path))
    }

    pub fn with_options(options: LockOptions) -> Self {
        Self::wrap(FileLock::with_options(options))
    }

    /// Defaults for ephemeral locks: write mode and fail-fast.
    pub fn default_options<T: Into<PathBuf>>(path: T) -> LockOptions {
        LockOptions::new(path)
            .mode(OpenMode::WRITE)
            .fail_when_locked(true)
    }
}

impl Default for EphemeralLock {
    fn default() -> Self {
        Self::new(DEFAULT_EPHEMERAL_PATH)
    }
}

impl<E: LockEngine> EphemeralLock<E> {
    /// Add delete-on-release behaviour to any engine.
    pub fn wrap(inner: E) -> Self {
        let registration = Some(cleanup::register(inner.path()));
        Self {
            inner,
            registration,
            owns_file: false,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Delete the file if we held it, and drop the shutdown registration.
    fn forget_file(&mut self) {
        if std::mem::take(&mut self.owns_file) {
            cleanup::remove_lock_file(self.inner.path());
        }
        if let Some(registration) = self.registration.take() {
            cleanup::deregister(registration);
        }
    }
}

impl<E: LockEngine> LockEngine for EphemeralLock<E> {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    fn handle_mut(&mut self) -> Option<&mut File> {
        self.inner.handle_mut()
    }

    fn acquire_with(&mut self, overrides: &Acquire) -> Result<&mut File> {
        self.inner.acquire_with(overrides)?;
        self.owns_file = true;
        if self.registration.is_none() {
            self.registration = Some(cleanup::register(self.inner.path()));
        }

        let path = self.inner.path().to_path_buf();
        self.inner
            .handle_mut()
            .ok_or_else(|| super::engine::missing_handle(&path))
    }

    fn release(&mut self) -> Result<()> {
        self.inner.release()?;
        // A contender that never held the lock must not delete the
        // holder's marker.
        if self.owns_file && !self.inner.is_locked() {
            self.forget_file();
        }
        Ok(())
    }
}

impl<E: LockEngine> Drop for EphemeralLock<E> {
    fn drop(&mut self) {
        while self.inner.is_locked() {
            if let Err(e) = self.inner.release() {
                warn!(path = %self.inner.path().display(), error = %e, "failed to release ephemeral lock");
                break;
            }
        }
        self.forget_file();
    }
}
