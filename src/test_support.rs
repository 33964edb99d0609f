use crate::locks::{AdvisoryLock, AttemptError, Flock, LockFlags};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Primitive that counts attempts and optionally reports contention forever
/// or fails to unlock.
#[derive(Debug, Clone, Default)]
pub(crate) struct CountingLock {
    attempts: Arc<AtomicUsize>,
    always_contended: bool,
    unlock_fails: bool,
}

impl CountingLock {
    /// Delegates to `Flock`.
    pub(crate) fn real() -> Self {
        Self::default()
    }

    /// Never succeeds.
    pub(crate) fn contended() -> Self {
        Self {
            always_contended: true,
            ..Self::default()
        }
    }

    /// Locks for real, but every unlock reports an error.
    pub(crate) fn unlock_fails() -> Self {
        Self {
            unlock_fails: true,
            ..Self::default()
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AdvisoryLock for CountingLock {
    fn lock(&self, file: &File, flags: LockFlags) -> Result<(), AttemptError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.always_contended {
            return Err(AttemptError::Contended(io::Error::from(
                io::ErrorKind::WouldBlock,
            )));
        }
        Flock.lock(file, flags)
    }

    fn unlock(&self, file: &File) -> io::Result<()> {
        if self.unlock_fails {
            return Err(io::Error::other("unlock refused"));
        }
        Flock.unlock(file)
    }
}

/// In-memory log sink shared with the subscriber.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    let bytes = buf.0.lock().unwrap_or_else(|poison| poison.into_inner()).clone();
    (output, String::from_utf8_lossy(&bytes).into_owned())
}
