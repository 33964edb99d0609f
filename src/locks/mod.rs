//! Locking subsystem for filegate.
//!
//! This module turns a single-shot OS advisory lock into usable locks:
//! - `FileLock`: one lock file, with timeout, polling and fail-fast policy
//! - `ReentrantLock`: counting decorator, acquirable repeatedly by its owner
//! - `EphemeralLock`: decorator deleting the lock file on release
//!
//! # Lock Files
//!
//! A lock file is only a rendezvous point; its content is irrelevant unless
//! the caller opens it in a write mode, in which case it is truncated after
//! (never before) the lock is held.
//!
//! # Acquisition
//!
//! The primitive is always attempted at least once. With `fail_when_locked`
//! contention is reported as `AlreadyLocked`; otherwise the engine polls every
//! `check_interval` until the timeout and then reports `Timeout`.
//!
//! # RAII Guards
//!
//! `LockEngine::lock` returns a guard that releases on drop, and every lock
//! type releases itself when dropped. If release fails during drop, a
//! warning is logged but the program does not crash.

pub mod cleanup;
mod engine;
mod ephemeral;
mod file_lock;
mod flags;
mod guard;
mod options;
mod primitive;
mod reentrant;


// Re-export public API
pub use engine::LockEngine;
pub use ephemeral::{DEFAULT_EPHEMERAL_PATH, EphemeralLock};
pub use file_lock::FileLock;
pub use flags::LockFlags;
pub use guard::LockGuard;
pub use options::{Acquire, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT, LockOptions, LockWarning};
pub use primitive::{AdvisoryLock, AttemptError, Flock, is_contention};
pub use reentrant::ReentrantLock;
