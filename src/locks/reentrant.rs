//! Reentrant (counting) decorator.

use super::engine::{LockEngine, missing_handle};
use super::file_lock::FileLock;
use super::options::{Acquire, LockOptions};
use crate::error::{LockError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A lock that may be acquired repeatedly by its owner.
///
/// Only the first acquire and the matching last release reach the wrapped
/// engine. Releasing more times than acquired is an error.
#[derive(Debug)]
pub struct ReentrantLock<E: LockEngine = FileLock> {
    inner: E,
    depth: usize,
}

impl ReentrantLock {
    /// A reentrant lock on `path` with default options.
    pub fn new<T: Into<PathBuf>>(path: T) -> Self {
        Self::wrap(FileLock::new(path))
    }

    pub fn with_options(options: LockOptions) -> Self {
        Self::wrap(FileLock::with_options(options))
    }
}

impl<E: LockEngine> ReentrantLock<E> {
    /// Add reentrancy to any engine. The engine must not be held yet.
    pub fn wrap(inner: E) -> Self {
        Self { inner, depth: 0 }
    }

    /// Number of unmatched acquisitions.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: LockEngine> LockEngine for ReentrantLock<E> {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn is_locked(&self) -> bool {
        self.depth > 0
    }

    fn handle_mut(&mut self) -> Option<&mut File> {
        self.inner.handle_mut()
    }

    fn acquire_with(&mut self, overrides: &Acquire) -> Result<&mut File> {
        if self.depth == 0 {
            self.inner.acquire_with(overrides)?;
        }

        if !self.inner.is_locked() {
            return Err(missing_handle(self.inner.path()));
        }
        self.depth += 1;

        let path = self.inner.path().to_path_buf();
        self.inner
            .handle_mut()
            .ok_or_else(|| missing_handle(&path))
    }

    fn release(&mut self) -> Result<()> {
        match self.depth {
            0 => Err(LockError::Usage(format!(
                "cannot release '{}' more times than it was acquired",
                self.inner.path().display()
            ))),
            1 => {
                self.depth = 0;
                self.inner.release()
            }
            _ => {
                self.depth -= 1;
                Ok(())
            }
        }
    }
}
