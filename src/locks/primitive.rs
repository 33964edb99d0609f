//! The OS advisory-lock primitive.
//!
//! `AdvisoryLock` is the seam between the acquisition engine and the
//! platform. The default implementation, `Flock`, goes through `fs2`
//! (`flock(2)` on Unix, `LockFileEx` on Windows).

use super::flags::LockFlags;
use fs2::FileExt;
use std::fs::File;
use std::io;

/// Why a single lock attempt did not succeed.
#[derive(Debug)]
pub enum AttemptError {
    /// The lock is held incompatibly by someone else. Worth retrying.
    Contended(io::Error),
    /// Any other failure. Never retried.
    Failed(io::Error),
}

/// Single-shot advisory lock operations on an open file.
pub trait AdvisoryLock {
    /// Try to lock `file` once with the given flags.
    fn lock(&self, file: &File, flags: LockFlags) -> Result<(), AttemptError>;

    /// Release any lock held through `file`.
    fn unlock(&self, file: &File) -> io::Result<()>;
}

/// `fs2`-backed advisory locks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flock;

impl AdvisoryLock for Flock {
    fn lock(&self, file: &File, flags: LockFlags) -> Result<(), AttemptError> {
        // Fully qualified: `std::fs::File` has inherent methods with the same names.
        let result = match (flags.is_shared(), flags.is_blocking()) {
            (false, false) => FileExt::try_lock_exclusive(file),
            (true, false) => FileExt::try_lock_shared(file),
            (false, true) => FileExt::lock_exclusive(file),
            (true, true) => FileExt::lock_shared(file),
        };

        result.map_err(|e| {
            if is_contention(&e) {
                AttemptError::Contended(e)
            } else {
                AttemptError::Failed(e)
            }
        })
    }

    fn unlock(&self, file: &File) -> io::Result<()> {
        FileExt::unlock(file)
    }
}

/// Whether an I/O error means "already locked by someone else".
pub fn is_contention(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    match (err.raw_os_error(), fs2::lock_contended_error().raw_os_error()) {
        (Some(code), Some(contended)) => code == contended,
        _ => false,
    }
}
