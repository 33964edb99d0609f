//! Filegate: cooperative cross-process locking through the filesystem.
//!
//! - [`locks::FileLock`]: one lock file with timeout, polling and fail-fast
//! - [`locks::ReentrantLock`]: acquirable repeatedly by its owner
//! - [`locks::EphemeralLock`]: lock file deleted on release or shutdown
//! - [`semaphore::BoundedSemaphore`]: at most N holders across processes
//! - [`fs::AtomicWriter`]: create a file so readers never see partial content
//!
//! Locks are advisory: they only exclude participants that take them too.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod logging;
pub mod semaphore;

#[cfg(test)]
mod test_support;

pub use error::{LockError, Result};
pub use locks::{EphemeralLock, FileLock, LockEngine, LockFlags, LockOptions, ReentrantLock};
pub use semaphore::{BoundedSemaphore, Permit};
