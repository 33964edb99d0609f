//! The `LockEngine` capability shared by every lock flavour.

use super::guard::LockGuard;
use super::options::Acquire;
use crate::error::{LockError, Result};
use std::fs::File;
use std::path::Path;

/// Acquire/release of one file-backed lock.
///
/// `FileLock` implements the retry loop; `ReentrantLock` and
/// `EphemeralLock` are decorators over any engine.
pub trait LockEngine {
    /// Path of the lock file.
    fn path(&self) -> &Path;

    /// Whether this instance currently holds the lock.
    fn is_locked(&self) -> bool;

    /// The locked handle, when held.
    fn handle_mut(&mut self) -> Option<&mut File>;

    /// Acquire with per-call overrides. Returns the held handle when the lock
    /// is already held.
    fn acquire_with(&mut self, overrides: &Acquire) -> Result<&mut File>;

    /// Release the lock.
    fn release(&mut self) -> Result<()>;

    /// Acquire with the configured defaults.
    fn acquire(&mut self) -> Result<&mut File> {
        self.acquire_with(&Acquire::default())
    }

    /// Acquire and return a guard that releases on drop.
    fn lock(&mut self) -> Result<LockGuard<'_, Self>>
    where
        Self: Sized,
    {
        self.acquire()?;
        Ok(LockGuard::new(self))
    }

    /// Run `f` with the locked handle, releasing afterwards on every path.
    fn with_lock<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut File) -> T,
    {
        let mut guard = self.lock()?;
        let output = match guard.file_mut() {
            Some(file) => f(file),
            None => return Err(missing_handle(guard.path())),
        };
        guard.release()?;
        Ok(output)
    }
}

pub(crate) fn missing_handle(path: &Path) -> LockError {
    LockError::Usage(format!(
        "lock on '{}' reported success without a handle",
        path.display()
    ))
}
