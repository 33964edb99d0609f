//! Default value functions used by the Config struct.

use crate::locks::{DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT};
use crate::semaphore::DEFAULT_PATTERN;

pub fn default_timeout() -> Option<f64> {
    Some(DEFAULT_TIMEOUT.as_secs_f64())
}

pub fn default_check_interval() -> f64 {
    DEFAULT_CHECK_INTERVAL.as_secs_f64()
}

pub fn default_mode() -> String {
    "a".to_string()
}

pub fn default_filename_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}
