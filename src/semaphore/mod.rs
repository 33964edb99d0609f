//! Cross-process bounded semaphore built from lock files.
//!
//! A semaphore with `maximum` permits is a set of `maximum` candidate lock
//! files. Holding a permit means holding an exclusive lock on one of them.
//!
//! # Slot Selection
//!
//! Every pass tries the candidates in a fresh random order. With a fixed
//! scan order all waiters would pile onto slot 0 and thrash; random order
//! spreads the attempts without any coordination. The random source can be
//! seeded for reproducible tests.

mod pattern;


pub use pattern::{DEFAULT_PATTERN, FilenamePattern};

use crate::error::{LockError, Result};
use crate::fs::OpenMode;
use crate::locks::{
    AdvisoryLock, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT, FileLock, Flock, LockEngine, LockOptions,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default semaphore name.
pub const DEFAULT_NAME: &str = "bounded_semaphore";

/// A held permit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permit {
    /// Slot number, `0..maximum`.
    pub index: usize,

    /// The lock file backing the slot.
    pub path: PathBuf,
}

/// Observed state of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub index: usize,
    pub path: PathBuf,
    pub busy: bool,
}

/// Limits how many processes run a section at once.
#[derive(Debug)]
pub struct BoundedSemaphore<P: AdvisoryLock + Clone = Flock> {
    maximum: usize,
    name: String,
    pattern: FilenamePattern,
    directory: PathBuf,
    timeout: Option<Duration>,
    check_interval: Duration,
    rng: StdRng,
    primitive: P,
    held: Option<(Permit, FileLock<P>)>,
}

impl BoundedSemaphore {
    /// A semaphore with `maximum` permits in the system temp directory.
    ///
    /// # Returns
    ///
    /// * `Err(LockError::Config)` - `maximum` is zero
    pub fn new(maximum: usize) -> Result<Self> {
        if maximum == 0 {
            return Err(LockError::Config(
                "semaphore maximum must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            maximum,
            name: DEFAULT_NAME.to_string(),
            pattern: FilenamePattern::default(),
            directory: std::env::temp_dir(),
            timeout: Some(DEFAULT_TIMEOUT),
            check_interval: DEFAULT_CHECK_INTERVAL,
            rng: StdRng::from_entropy(),
            primitive: Flock,
            held: None,
        })
    }
}

impl<P: AdvisoryLock + Clone> BoundedSemaphore<P> {
    /// Lock the slot files through a custom advisory-lock primitive.
    pub fn with_primitive<Q: AdvisoryLock + Clone>(self, primitive: Q) -> BoundedSemaphore<Q> {
        BoundedSemaphore {
            maximum: self.maximum,
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            directory: self.directory.clone(),
            timeout: self.timeout,
            check_interval: self.check_interval,
            rng: self.rng.clone(),
            primitive,
            held: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn pattern(mut self, pattern: FilenamePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Use a deterministic slot order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }

    pub fn semaphore_name(&self) -> &str {
        &self.name
    }

    pub fn lock_directory(&self) -> &Path {
        &self.directory
    }

    /// The currently held permit.
    pub fn permit(&self) -> Option<&Permit> {
        self.held.as_ref().map(|(permit, _)| permit)
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Lock file of slot `number`.
    pub fn filename(&self, number: usize) -> PathBuf {
        self.directory.join(self.pattern.render(&self.name, number))
    }

    /// All candidate lock files in slot order.
    pub fn filenames(&self) -> Vec<PathBuf> {
        (0..self.maximum).map(|n| self.filename(n)).collect()
    }

    /// All candidate lock files in a fresh random order.
    pub fn random_filenames(&mut self) -> Vec<PathBuf> {
        self.random_order()
            .into_iter()
            .map(|n| self.filename(n))
            .collect()
    }

    fn random_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.maximum).collect();
        order.shuffle(&mut self.rng);
        order
    }

    /// Acquire a permit with the configured timeout and interval.
    pub fn acquire(&mut self) -> Result<Permit> {
        self.acquire_with(None, None)
    }

    /// Acquire a permit, overriding timeout and interval for this call.
    ///
    /// # Returns
    ///
    /// * `Ok(Permit)` - A slot was locked
    /// * `Err(LockError::AlreadyLocked)` - Every slot stayed busy
    /// * `Err(LockError::Usage)` - A permit is already held by this instance
    pub fn acquire_with(
        &mut self,
        timeout: Option<Duration>,
        check_interval: Option<Duration>,
    ) -> Result<Permit> {
        if self.held.is_some() {
            return Err(LockError::Usage(format!(
                "semaphore '{}' already holds a permit",
                self.name
            )));
        }

        let timeout = timeout.or(self.timeout).unwrap_or(Duration::ZERO);
        let check_interval = check_interval.unwrap_or(self.check_interval);

        self.ensure_directory()?;

        if let Some(permit) = self.try_lock_any()? {
            return Ok(permit);
        }

        if timeout.is_zero() {
            return Err(self.full());
        }

        let deadline = Instant::now().checked_add(timeout);
        loop {
            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => return Err(self.full()),
                Some(deadline) => deadline - now,
                None => check_interval,
            };
            thread::sleep(check_interval.min(remaining));

            if let Some(permit) = self.try_lock_any()? {
                return Ok(permit);
            }
        }
    }

    /// One pass over the candidates in random order.
    fn try_lock_any(&mut self) -> Result<Option<Permit>> {
        for index in self.random_order() {
            let path = self.filename(index);
            let mut lock = FileLock::with_primitive(single_attempt(&path), self.primitive.clone());

            match lock.acquire().map(|_| ()) {
                Ok(()) => {
                    debug!(semaphore = %self.name, slot = index, "permit acquired");
                    let permit = Permit { index, path };
                    self.held = Some((permit.clone(), lock));
                    return Ok(Some(permit));
                }
                Err(LockError::AlreadyLocked { .. }) => {
                    debug!(semaphore = %self.name, slot = index, "slot busy");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Release the held permit.
    pub fn release(&mut self) -> Result<()> {
        match self.held.take() {
            Some((permit, mut lock)) => {
                debug!(semaphore = %self.name, slot = permit.index, "permit released");
                lock.release()
            }
            None => Err(LockError::Usage(format!(
                "semaphore '{}' has no permit to release",
                self.name
            ))),
        }
    }

    /// Run `f` while holding a permit.
    pub fn with_permit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Permit) -> T,
    {
        let permit = self.acquire()?;
        let guard = PermitGuard::new(self);
        let output = f(&permit);
        guard.release()?;
        Ok(output)
    }

    /// Probe every slot without keeping anything locked.
    ///
    /// Slots whose file does not exist are free. A slot held in shared mode
    /// by someone else reports busy.
    pub fn probe(&self) -> Result<Vec<SlotStatus>> {
        let mut slots = Vec::with_capacity(self.maximum);
        for index in 0..self.maximum {
            let path = self.filename(index);
            let own = self
                .permit()
                .is_some_and(|permit| permit.index == index);

            let busy = if own {
                true
            } else if !path.exists() {
                false
            } else {
                let options = single_attempt(&path).mode(OpenMode::parse("r")?);
                let mut lock = FileLock::with_primitive(options, self.primitive.clone());
                match lock.acquire().map(|_| ()) {
                    Ok(()) => false,
                    Err(LockError::AlreadyLocked { .. }) => true,
                    Err(e) => return Err(e),
                }
            };

            slots.push(SlotStatus { index, path, busy });
        }
        Ok(slots)
    }

    fn ensure_directory(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() || self.directory.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.directory).map_err(|e| {
            LockError::resource(
                format!(
                    "failed to create semaphore directory '{}'",
                    self.directory.display()
                ),
                e,
            )
        })
    }

    fn full(&self) -> LockError {
        LockError::AlreadyLocked {
            resource: format!(
                "semaphore '{}' (all {} permits)",
                self.name, self.maximum
            ),
            source: None,
        }
    }
}

impl<P: AdvisoryLock + Clone> Drop for BoundedSemaphore<P> {
    fn drop(&mut self) {
        if let Some((permit, mut lock)) = self.held.take()
            && let Err(e) = lock.release()
        {
            warn!(path = %permit.path.display(), error = %e, "failed to release permit");
        }
    }
}

/// Releases a held permit once, on drop unless released explicitly.
struct PermitGuard<'a, P: AdvisoryLock + Clone> {
    semaphore: &'a mut BoundedSemaphore<P>,
    released: bool,
}

impl<'a, P: AdvisoryLock + Clone> PermitGuard<'a, P> {
    fn new(semaphore: &'a mut BoundedSemaphore<P>) -> Self {
        Self {
            semaphore,
            released: false,
        }
    }

    /// Release now, surfacing any error.
    fn release(mut self) -> Result<()> {
        self.released = true;
        self.semaphore.release()
    }
}

impl<P: AdvisoryLock + Clone> Drop for PermitGuard<'_, P> {
    fn drop(&mut self) {
        if !self.released
            && self.semaphore.is_held()
            && let Err(e) = self.semaphore.release()
        {
            warn!(error = %e, "failed to release permit");
        }
    }
}

/// Fail-fast, single-attempt options for one candidate slot.
fn single_attempt(path: &Path) -> LockOptions {
    LockOptions::new(path)
        .timeout(None)
        .fail_when_locked(true)
}
