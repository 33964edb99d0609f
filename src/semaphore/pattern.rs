//! Permit filename patterns.
//!
//! A pattern names each permit file from the semaphore name and the slot
//! number, e.g. `{name}.{number:02d}.lock` gives `jobs.00.lock`,
//! `jobs.01.lock`, ... `{number:0Nd}` zero-pads to width N and
//! `{number:Nd}` right-aligns with spaces, as `str.format` does.

use crate::error::{LockError, Result};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

/// Default pattern: two-digit zero-padded slot numbers.
pub const DEFAULT_PATTERN: &str = "{name}.{number:02d}.lock";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(name|number)(?::(0)?(\d*)d)?\}").expect("Invalid placeholder regex")
});

/// A validated permit filename pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern {
    raw: String,
}

impl FilenamePattern {
    /// Parse a pattern. It must contain a `{number}` placeholder, otherwise
    /// every permit would map to the same file.
    pub fn parse(pattern: &str) -> Result<Self> {
        let has_number = PLACEHOLDER
            .captures_iter(pattern)
            .any(|caps| &caps[1] == "number");

        if !has_number {
            return Err(LockError::Config(format!(
                "filename pattern '{}' must contain a {{number}} placeholder",
                pattern
            )));
        }

        Ok(Self {
            raw: pattern.to_string(),
        })
    }

    /// Render the filename for one slot.
    pub fn render(&self, name: &str, number: usize) -> String {
        PLACEHOLDER
            .replace_all(&self.raw, |caps: &Captures| {
                if &caps[1] == "name" {
                    return name.to_string();
                }
                let width = caps
                    .get(3)
                    .and_then(|w| w.as_str().parse::<usize>().ok())
                    .unwrap_or(0);
                if caps.get(2).is_some() {
                    format!("{:0width$}", number, width = width)
                } else {
                    format!("{:>width$}", number, width = width)
                }
            })
            .into_owned()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for FilenamePattern {
    fn default() -> Self {
        Self {
            raw: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl fmt::Display for FilenamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_pads_two_digits() {
        let pattern = FilenamePattern::default();
        assert_eq!(pattern.render("bounded_semaphore", 0), "bounded_semaphore.00.lock");
        assert_eq!(pattern.render("jobs", 7), "jobs.07.lock");
        assert_eq!(pattern.render("jobs", 123), "jobs.123.lock");
    }

    #[test]
    fn custom_widths_and_plain_number() {
        let pattern = FilenamePattern::parse("{name}-{number:04d}.pid").unwrap();
        assert_eq!(pattern.render("w", 3), "w-0003.pid");

        let pattern = FilenamePattern::parse("{name}-{number:d}.pid").unwrap();
        assert_eq!(pattern.render("w", 3), "w-3.pid");

        let pattern = FilenamePattern::parse("slot{number}").unwrap();
        assert_eq!(pattern.render("ignored", 12), "slot12");
    }

    #[test]
    fn width_without_zero_flag_pads_with_spaces() {
        let pattern = FilenamePattern::parse("{name}.{number:4d}.lock").unwrap();
        assert_eq!(pattern.render("w", 3), "w.   3.lock");
        assert_eq!(pattern.render("w", 12345), "w.12345.lock");
    }

    #[test]
    fn name_may_appear_anywhere_or_repeat() {
        let pattern = FilenamePattern::parse("{name}/{name}.{number:03d}").unwrap();
        assert_eq!(pattern.render("db", 1), "db/db.001");
    }

    #[test]
    fn pattern_without_number_is_rejected() {
        let err = FilenamePattern::parse("{name}.lock").unwrap_err();
        assert!(matches!(err, LockError::Config(_)));
        assert!(err.to_string().contains("{number}"));
    }
}
