//! RAII lock guard implementation.

use super::engine::LockEngine;
use crate::error::Result;
use std::fs::File;
use std::path::Path;
use tracing::warn;

/// RAII guard for an acquired lock.
///
/// When dropped, the lock is released once. If the release fails, a warning
/// is logged but no panic occurs.
#[derive(Debug)]
pub struct LockGuard<'a, E: LockEngine> {
    /// The engine holding the lock.
    engine: &'a mut E,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, E: LockEngine> LockGuard<'a, E> {
    /// Wrap an engine that has just been acquired.
    pub(super) fn new(engine: &'a mut E) -> Self {
        Self {
            engine,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    /// The locked handle.
    pub fn file_mut(&mut self) -> Option<&mut File> {
        self.engine.handle_mut()
    }

    /// Manually release the lock, surfacing any error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.engine.release()
    }
}

impl<E: LockEngine> Drop for LockGuard<'_, E> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.engine.release()
        {
            warn!(
                path = %self.engine.path().display(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}
