//! Error types for filegate.
//!
//! Uses thiserror for derive macros. Contention and timeouts keep the
//! underlying OS error as their source so callers can inspect it.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for lock, semaphore and atomic-write operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// Contention was detected and the fail-fast policy applied, or every
    /// permit of a semaphore was busy.
    #[error("{resource} is already locked")]
    AlreadyLocked {
        resource: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The deadline passed while waiting for contention to clear.
    #[error("timed out after {timeout:?} waiting for lock on '{}'", path.display())]
    Timeout {
        path: PathBuf,
        timeout: Duration,
        #[source]
        source: Option<io::Error>,
    },

    /// Programming misuse of a lock or semaphore.
    #[error("{0}")]
    Usage(String),

    /// Opening, closing, syncing or renaming the underlying file failed.
    #[error("{context}: {source}")]
    Resource {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LockError {
    /// Build a `Resource` error with a context message.
    pub fn resource(context: impl Into<String>, source: io::Error) -> Self {
        LockError::Resource {
            context: context.into(),
            source,
        }
    }

    /// Returns true for the recoverable contention outcomes.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            LockError::AlreadyLocked { .. } | LockError::Timeout { .. }
        )
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::AlreadyLocked { .. } => exit_codes::LOCK_FAILURE,
            LockError::Timeout { .. } => exit_codes::LOCK_FAILURE,
            LockError::Usage(_) => exit_codes::USER_ERROR,
            LockError::Config(_) => exit_codes::USER_ERROR,
            LockError::Resource { .. } => exit_codes::RESOURCE_FAILURE,
        }
    }
}

/// Result type alias for filegate operations.
pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn contention_errors_have_lock_exit_code() {
        let err = LockError::AlreadyLocked {
            resource: "a.lock".to_string(),
            source: None,
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(err.is_contention());

        let err = LockError::Timeout {
            path: PathBuf::from("a.lock"),
            timeout: Duration::from_millis(10),
            source: None,
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(err.is_contention());
    }

    #[test]
    fn usage_and_config_errors_have_user_exit_code() {
        let err = LockError::Usage("released more times than acquired".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(!err.is_contention());

        let err = LockError::Config("bad mode".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn resource_error_keeps_source() {
        let err = LockError::resource(
            "failed to open 'x'",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.exit_code(), exit_codes::RESOURCE_FAILURE);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "failed to open 'x': denied");
    }

    #[test]
    fn timeout_carries_last_contention_error() {
        let err = LockError::Timeout {
            path: PathBuf::from("/tmp/x.lock"),
            timeout: Duration::from_millis(50),
            source: Some(io::Error::from(io::ErrorKind::WouldBlock)),
        };
        assert!(err.to_string().contains("/tmp/x.lock"));
        assert!(err.source().is_some());
    }
}
