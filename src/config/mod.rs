//! Configuration model for filegate.
//!
//! This module defines the Config struct loaded from a YAML file passed with
//! `--config`. It supports forward-compatible YAML parsing (unknown fields are
//! ignored), defaults matching the library defaults, and validation of config
//! values before any lock is built from them.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
