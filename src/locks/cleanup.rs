//! Process-wide registry of ephemeral lock files.
//!
//! An `EphemeralLock` registers its file when it acquires and deregisters on
//! release. Anything still registered at orderly shutdown is removed by
//! [`drain`], which runs when the [`ShutdownGuard`] returned by [`install`]
//! is dropped (the `filegate` binary holds one for the whole of `main`).
//!
//! This is a safety net for locks the program forgot to release. Explicit
//! release stays the primary path.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tracing::{debug, warn};

static PENDING: LazyLock<Mutex<BTreeMap<u64, PathBuf>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying one registered file.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a registration leaves the file registered until drain"]
pub struct Registration(u64);

fn pending() -> MutexGuard<'static, BTreeMap<u64, PathBuf>> {
    PENDING.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Register `path` for removal at shutdown.
///
/// Relative paths are resolved against the current directory now, so a
/// later `chdir` does not redirect the cleanup.
pub fn register(path: &Path) -> Registration {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    debug!(path = %path.display(), id, "registered ephemeral lock file");
    pending().insert(id, path);
    Registration(id)
}

/// Remove a registration without touching the file.
pub fn deregister(registration: Registration) -> bool {
    pending().remove(&registration.0).is_some()
}

/// Files currently registered.
pub fn registered() -> Vec<PathBuf> {
    pending().values().cloned().collect()
}

/// Delete every registered file and clear the registry.
///
/// Returns how many files were actually removed.
pub fn drain() -> usize {
    let paths = std::mem::take(&mut *pending());
    paths
        .into_values()
        .filter(|path| remove_lock_file(path))
        .count()
}

/// Best-effort removal of a lock file. A missing file is not an error.
pub(crate) fn remove_lock_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove lock file");
            false
        }
    }
}

/// Drains the registry when dropped.
#[derive(Debug)]
#[must_use = "the registry is drained when the guard is dropped"]
pub struct ShutdownGuard {
    _private: (),
}

/// Install the shutdown safety net for the lifetime of the returned guard.
pub fn install() -> ShutdownGuard {
    ShutdownGuard { _private: () }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        let removed = drain();
        if removed > 0 {
            debug!(removed, "removed leftover ephemeral lock files");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn drain_removes_registered_files() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.lock");
        let b = temp.path().join("b.lock");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();

        let _ra = register(&a);
        let _rb = register(&b);
        assert!(registered().contains(&a));

        assert_eq!(drain(), 2);
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(registered().is_empty());
    }

    #[test]
    #[serial]
    fn deregistered_files_survive_drain() {
        let temp = TempDir::new().unwrap();
        let kept = temp.path().join("kept.lock");
        fs::write(&kept, "").unwrap();

        let registration = register(&kept);
        assert!(deregister(registration));

        assert_eq!(drain(), 0);
        assert!(kept.exists());
    }

    #[test]
    #[serial]
    fn missing_files_are_not_counted() {
        let temp = TempDir::new().unwrap();
        let _r = register(&temp.path().join("never-created.lock"));

        assert_eq!(drain(), 0);
    }

    #[test]
    #[serial]
    fn shutdown_guard_drains_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("leftover.lock");
        fs::write(&path, "").unwrap();

        let guard = install();
        let _r = register(&path);
        drop(guard);

        assert!(!path.exists());
    }
}
