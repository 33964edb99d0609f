//! Filesystem utilities for filegate.
//!
//! Open-mode parsing for lock files and atomic creation of new files.

pub mod atomic;
mod mode;

pub use atomic::{AtomicWriter, atomic_write, atomic_write_file};
pub use mode::OpenMode;
