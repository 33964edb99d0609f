//! Open-mode strings for lock files.
//!
//! Lock files are opened from short mode strings (`"a"`, `"r+"`, `"wb"`...).
//! A mode that would truncate on open (`w`) is rewritten to its append
//! equivalent and remembered as "truncate after lock", so the file is only
//! emptied once the advisory lock is actually held.

use crate::error::{LockError, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// A parsed open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    read: bool,
    write: bool,
    append: bool,
    create: bool,
    create_new: bool,
    truncate_after_lock: bool,
}

impl OpenMode {
    /// Append mode (`"a"`): create if missing, keep existing content.
    pub const APPEND: OpenMode = OpenMode {
        read: false,
        write: true,
        append: true,
        create: true,
        create_new: false,
        truncate_after_lock: false,
    };

    /// Write mode (`"w"`): like append, but emptied once the lock is held.
    pub const WRITE: OpenMode = OpenMode {
        truncate_after_lock: true,
        ..OpenMode::APPEND
    };

    /// Parse a mode string.
    ///
    /// Exactly one of `r`, `w`, `a`, `x` must be present, optionally followed
    /// by `+` (read and write) and `b`/`t` (accepted and ignored).
    pub fn parse(mode: &str) -> Result<Self> {
        let mut primary = None;
        let mut plus = false;

        for c in mode.chars() {
            match c {
                'r' | 'w' | 'a' | 'x' => {
                    if primary.replace(c).is_some() {
                        return Err(invalid(mode, "more than one of 'r', 'w', 'a', 'x'"));
                    }
                }
                '+' if !plus => plus = true,
                'b' | 't' => {}
                _ => return Err(invalid(mode, &format!("unexpected character '{}'", c))),
            }
        }

        let parsed = match primary {
            Some('r') => OpenMode {
                read: true,
                write: plus,
                append: false,
                create: false,
                create_new: false,
                truncate_after_lock: false,
            },
            // `w` becomes `a`: truncation is deferred until the lock is held.
            Some('w') => OpenMode {
                read: plus,
                ..OpenMode::WRITE
            },
            Some('a') => OpenMode {
                read: plus,
                ..OpenMode::APPEND
            },
            Some('x') => OpenMode {
                read: plus,
                write: true,
                append: false,
                create: false,
                create_new: true,
                truncate_after_lock: false,
            },
            _ => return Err(invalid(mode, "missing one of 'r', 'w', 'a', 'x'")),
        };

        Ok(parsed)
    }

    /// Whether the file is truncated once the lock has been acquired.
    pub fn truncate_after_lock(&self) -> bool {
        self.truncate_after_lock
    }

    /// Whether the handle is readable.
    pub fn readable(&self) -> bool {
        self.read
    }

    /// Whether the handle is writable.
    pub fn writable(&self) -> bool {
        self.write || self.append
    }

    /// Build the `OpenOptions` for this mode. Never truncates at open time.
    pub fn options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .append(self.append)
            .create(self.create)
            .create_new(self.create_new)
            .truncate(false);
        options
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        OpenMode::APPEND
    }
}

impl FromStr for OpenMode {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self> {
        OpenMode::parse(s)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primary = if self.truncate_after_lock {
            "w"
        } else if self.create_new {
            "x"
        } else if self.append {
            "a"
        } else {
            "r"
        };
        let plus = if self.create_new || self.append {
            self.read
        } else {
            self.write
        };
        write!(f, "{}{}", primary, if plus { "+" } else { "" })
    }
}

fn invalid(mode: &str, reason: &str) -> LockError {
    LockError::Config(format!("invalid open mode '{}': {}", mode, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_mode_defers_truncation() {
        let mode = OpenMode::parse("w").unwrap();
        assert!(mode.truncate_after_lock());
        assert!(mode.writable());
        assert!(!mode.readable());

        let mode = OpenMode::parse("w+").unwrap();
        assert!(mode.truncate_after_lock());
        assert!(mode.readable());

        let mode = OpenMode::parse("wb").unwrap();
        assert!(mode.truncate_after_lock());
    }

    #[test]
    fn append_and_read_modes_never_truncate() {
        for m in ["a", "ab", "a+", "r", "r+", "rb", "x"] {
            let mode = OpenMode::parse(m).unwrap();
            assert!(!mode.truncate_after_lock(), "mode {} should not truncate", m);
        }
    }

    #[test]
    fn read_only_mode_is_not_writable() {
        let mode = OpenMode::parse("r").unwrap();
        assert!(mode.readable());
        assert!(!mode.writable());

        let mode = OpenMode::parse("r+").unwrap();
        assert!(mode.writable());
    }

    #[test]
    fn invalid_modes_are_rejected() {
        for m in ["", "b", "rw", "q", "a++"] {
            let err = OpenMode::parse(m).unwrap_err();
            assert!(matches!(err, LockError::Config(_)), "mode {:?}", m);
        }
    }

    #[test]
    fn display_reports_requested_mode() {
        assert_eq!(OpenMode::parse("w").unwrap().to_string(), "w");
        assert_eq!(OpenMode::parse("a+").unwrap().to_string(), "a+");
        assert_eq!(OpenMode::parse("r+").unwrap().to_string(), "r+");
        assert_eq!(OpenMode::default().to_string(), "a");
    }

    #[test]
    fn write_mode_does_not_truncate_at_open() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("data.txt");
        std::fs::write(&path, "keep me").unwrap();

        let mode = OpenMode::parse("w").unwrap();
        let _file = mode.options().open(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
