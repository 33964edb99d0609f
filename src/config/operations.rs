//! Config loading, validation, and conversion into locks and semaphores.

use super::model::Config;
use crate::error::{LockError, Result};
use crate::fs::OpenMode;
use crate::locks::{LockFlags, LockOptions};
use crate::semaphore::{BoundedSemaphore, FilenamePattern};
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LockError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LockError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LockError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `timeout` and `check_interval` must be finite and non-negative
    /// - `mode` must be a valid open mode
    /// - `filename_pattern` must contain a `{number}` placeholder
    pub fn validate(&self) -> Result<()> {
        self.timeout_duration()?;
        self.check_interval_duration()?;
        self.open_mode()?;
        FilenamePattern::parse(&self.filename_pattern)?;
        Ok(())
    }

    pub fn timeout_duration(&self) -> Result<Option<Duration>> {
        self.timeout
            .map(|secs| seconds("timeout", secs))
            .transpose()
    }

    pub fn check_interval_duration(&self) -> Result<Duration> {
        seconds("check_interval", self.check_interval)
    }

    pub fn open_mode(&self) -> Result<OpenMode> {
        OpenMode::parse(&self.mode)
    }

    /// Lock flags for the `shared` and `blocking` settings.
    pub fn flags(&self) -> LockFlags {
        let kind = if self.shared {
            LockFlags::SHARED
        } else {
            LockFlags::EXCLUSIVE
        };
        if self.blocking {
            kind
        } else {
            kind | LockFlags::NON_BLOCKING
        }
    }

    /// Options for a lock on `path` using these defaults.
    pub fn lock_options<P: Into<PathBuf>>(&self, path: P) -> Result<LockOptions> {
        Ok(LockOptions::new(path)
            .mode(self.open_mode()?)
            .timeout(self.timeout_duration()?)
            .check_interval(self.check_interval_duration()?)
            .fail_when_locked(self.fail_when_locked)
            .flags(self.flags()))
    }

    /// A semaphore named `name` with `maximum` permits using these defaults.
    pub fn semaphore(&self, name: &str, maximum: usize) -> Result<BoundedSemaphore> {
        let mut semaphore = BoundedSemaphore::new(maximum)?
            .name(name)
            .pattern(FilenamePattern::parse(&self.filename_pattern)?)
            .timeout(self.timeout_duration()?)
            .check_interval(self.check_interval_duration()?);

        if let Some(directory) = &self.semaphore_directory {
            semaphore = semaphore.directory(directory);
        }
        Ok(semaphore)
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        LockError::Config(format!(
            "{} must be a non-negative number of seconds (found {})",
            field, secs
        ))
    })
}
