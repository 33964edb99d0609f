//! Atomic file creation.
//!
//! Content is written to a temporary file in the target's directory, synced
//! to disk, then renamed into place in one filesystem operation. Readers see
//! either no file or the complete file, never a partial one.
//!
//! # Implementation Strategy
//!
//! 1. Refuse targets that already exist (this is creation, not replacement)
//! 2. Create a temporary file in the same directory (same filesystem, so the
//!    rename is atomic)
//! 3. On commit: flush, fsync, rename without clobbering, fsync the directory
//!
//! The temporary file is removed whenever the writer is dropped without a
//! successful commit. Removal failures are ignored.

use crate::error::{LockError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Scoped writer that makes a new file appear atomically on commit.
///
/// # Example
///
/// ```no_run
/// use filegate::fs::AtomicWriter;
/// use std::io::Write;
///
/// let mut writer = AtomicWriter::create("report.txt")?;
/// writer.write_all(b"all or nothing")?;
/// writer.commit()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AtomicWriter {
    target: PathBuf,
    temp: Option<NamedTempFile>,
}

impl AtomicWriter {
    /// Start an atomic write to `path`.
    ///
    /// # Returns
    ///
    /// * `Err(LockError::Usage)` - The target already exists
    /// * `Err(LockError::Resource)` - The directory or temp file could not be created
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let target = path.as_ref().to_path_buf();

        if target.exists() {
            return Err(LockError::Usage(format!(
                "refusing atomic write: '{}' already exists",
                target.display()
            )));
        }

        let parent = parent_dir(&target);
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                LockError::resource(
                    format!("failed to create parent directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let filename = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LockError::Usage(format!("invalid file path '{}'", target.display())))?;

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", filename))
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| {
                LockError::resource(
                    format!("failed to create temporary file in '{}'", parent.display()),
                    e,
                )
            })?;

        debug!(target = %target.display(), temp = %temp.path().display(), "started atomic write");

        Ok(Self {
            target,
            temp: Some(temp),
        })
    }

    /// The final path the content will be published at.
    pub fn path(&self) -> &Path {
        &self.target
    }

    /// The temporary file currently receiving writes.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_ref().map(|t| t.path())
    }

    /// Flush, sync and publish the content at the target path.
    ///
    /// Fails if the target was created by someone else in the meantime; the
    /// existing file is never overwritten.
    pub fn commit(mut self) -> Result<()> {
        let Some(mut temp) = self.temp.take() else {
            return Err(LockError::Usage("atomic write already finished".to_string()));
        };

        temp.flush()
            .map_err(|e| LockError::resource("failed to flush temporary file", e))?;

        temp.as_file()
            .sync_all()
            .map_err(|e| LockError::resource("failed to sync temporary file to disk", e))?;

        // On failure the temp file travels back inside the error and is
        // removed when the error is dropped.
        temp.persist_noclobber(&self.target).map_err(|e| {
            LockError::resource(
                format!("failed to move temporary file to '{}'", self.target.display()),
                e.error,
            )
        })?;

        sync_dir(parent_dir(&self.target));

        debug!(target = %self.target.display(), "committed atomic write");
        Ok(())
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.temp.as_mut() {
            Some(temp) => temp.write(buf),
            None => Err(io::Error::other("atomic write already finished")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.temp.as_mut() {
            Some(temp) => temp.flush(),
            None => Ok(()),
        }
    }
}

/// Atomically create `path` holding `content`.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let mut writer = AtomicWriter::create(path)?;
    writer
        .write_all(content)
        .map_err(|e| LockError::resource("failed to write to temporary file", e))?;
    writer.commit()
}

/// Atomically create `path` holding a string.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Persist the directory entry. Best-effort.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
    #[cfg(not(unix))]
    let _ = dir;
}
