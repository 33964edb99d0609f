//! Lock mode flags.

use crate::error::{LockError, Result};
use std::fmt;
use std::ops::BitOr;

/// Bitmask of advisory lock mode flags.
///
/// Exactly one of `EXCLUSIVE` or `SHARED` must be set. Without
/// `NON_BLOCKING` the primitive waits inside the OS call, which cannot
/// honour a timeout.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockFlags(u8);

impl LockFlags {
    /// Exclusive (writer) lock.
    pub const EXCLUSIVE: LockFlags = LockFlags(0b001);
    /// Shared (reader) lock.
    pub const SHARED: LockFlags = LockFlags(0b010);
    /// Fail with contention instead of waiting in the OS.
    pub const NON_BLOCKING: LockFlags = LockFlags(0b100);

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: LockFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_shared(self) -> bool {
        self.contains(LockFlags::SHARED)
    }

    pub fn is_blocking(self) -> bool {
        !self.contains(LockFlags::NON_BLOCKING)
    }

    /// Check that exactly one of exclusive/shared is requested.
    pub fn validate(self) -> Result<()> {
        match (
            self.contains(LockFlags::EXCLUSIVE),
            self.contains(LockFlags::SHARED),
        ) {
            (true, false) | (false, true) => Ok(()),
            (true, true) => Err(LockError::Config(
                "lock flags cannot be both exclusive and shared".to_string(),
            )),
            (false, false) => Err(LockError::Config(
                "lock flags must include exclusive or shared".to_string(),
            )),
        }
    }
}

impl Default for LockFlags {
    fn default() -> Self {
        LockFlags::EXCLUSIVE | LockFlags::NON_BLOCKING
    }
}

impl BitOr for LockFlags {
    type Output = LockFlags;

    fn bitor(self, rhs: LockFlags) -> LockFlags {
        LockFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for LockFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (LockFlags::EXCLUSIVE, "EXCLUSIVE"),
            (LockFlags::SHARED, "SHARED"),
            (LockFlags::NON_BLOCKING, "NON_BLOCKING"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();

        if names.is_empty() {
            write!(f, "LockFlags(empty)")
        } else {
            write!(f, "LockFlags({})", names.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_exclusive_non_blocking() {
        let flags = LockFlags::default();
        assert!(flags.contains(LockFlags::EXCLUSIVE));
        assert!(!flags.is_shared());
        assert!(!flags.is_blocking());
        assert!(flags.validate().is_ok());
    }

    #[test]
    fn shared_without_non_blocking_is_blocking() {
        let flags = LockFlags::SHARED;
        assert!(flags.is_shared());
        assert!(flags.is_blocking());
    }

    #[test]
    fn conflicting_or_missing_modes_are_invalid() {
        assert!(
            (LockFlags::EXCLUSIVE | LockFlags::SHARED)
                .validate()
                .is_err()
        );
        assert!(LockFlags::NON_BLOCKING.validate().is_err());
    }

    #[test]
    fn debug_lists_flag_names() {
        let flags = LockFlags::SHARED | LockFlags::NON_BLOCKING;
        assert_eq!(format!("{:?}", flags), "LockFlags(SHARED | NON_BLOCKING)");
    }
}
