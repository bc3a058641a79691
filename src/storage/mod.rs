//! Key/value persistence with a transparent in-process fallback.
//!
//! DESIGN
//! ======
//! A [`StorageMedium`] is fallible (disk full, sandboxed browser, disabled
//! `localStorage`). [`PersistentStore`] wraps one and never reports those
//! failures to its caller: the medium is probed once at construction with a
//! write-read-delete of a throwaway key, and a medium that fails the probe is
//! replaced by an in-process map for the rest of the process.
//!
//! A medium that passes the probe but later fails a write or remove is kept
//! for reads only: that write and every later one land in an in-process
//! overlay, and reads consult the overlay before falling through to the
//! medium. Keys persisted before the failure therefore stay readable.

pub mod file;
#[cfg(feature = "web")]
pub mod local;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

pub use file::FileMedium;
#[cfg(feature = "web")]
pub use local::LocalStorageMedium;

const PROBE_VALUE: &str = "hi";

// =============================================================================
// ERROR
// =============================================================================

/// Failure reported by a [`StorageMedium`]. Never escapes [`PersistentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The medium cannot be reached at all.
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a JSON object of strings.
    #[error("storage contents malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The probe value was written but did not read back unchanged.
    #[error("storage probe read back {found:?}")]
    ProbeMismatch { found: Option<String> },
}

// =============================================================================
// MEDIUM
// =============================================================================

/// A place where string values can be kept under string keys.
pub trait StorageMedium: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the medium rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the medium rejects the delete.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Non-durable medium backed by a `HashMap`. Used directly in tests and as the
/// fallback behind every [`PersistentStore`].
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMedium {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_item(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_item(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_item(key);
        Ok(())
    }
}

/// Write, read back and delete a disposable key.
fn probe(medium: &dyn StorageMedium) -> Result<(), StorageError> {
    let key = probe_key();
    medium.set(&key, PROBE_VALUE)?;
    let found = medium.get(&key)?;
    medium.remove(&key)?;
    if found.as_deref() != Some(PROBE_VALUE) {
        return Err(StorageError::ProbeMismatch { found });
    }
    Ok(())
}

fn probe_key() -> String {
    let suffix: u64 = rand::rng().random();
    format!("__cyclity-probe-{suffix:016x}__")
}

fn read_medium(medium: &dyn StorageMedium, key: &str) -> Option<String> {
    match medium.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, key, "storage read failed");
            None
        }
    }
}

// =============================================================================
// PERSISTENT STORE
// =============================================================================

enum Backend {
    Durable(Box<dyn StorageMedium>),
    /// Read-only medium under an overlay of later writes; `None` marks a
    /// removal.
    Degraded { medium: Box<dyn StorageMedium>, overlay: HashMap<String, Option<String>> },
    Fallback(MemoryMedium),
}

/// Infallible key/value store. Cloning yields another handle to the same
/// entries.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<Mutex<Backend>>,
}

impl PersistentStore {
    /// Probe `medium` and use it if it works, otherwise fall back to memory.
    pub fn open<M>(medium: M) -> Self
    where
        M: StorageMedium + 'static,
    {
        let backend = match probe(&medium) {
            Ok(()) => {
                debug!("storage probe passed");
                Backend::Durable(Box::new(medium))
            }
            Err(e) => {
                warn!(error = %e, "storage unavailable; falling back to in-memory store");
                Backend::Fallback(MemoryMedium::new())
            }
        };
        Self { backend: Arc::new(Mutex::new(backend)) }
    }

    /// A store that never touches durable media.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { backend: Arc::new(Mutex::new(Backend::Fallback(MemoryMedium::new()))) }
    }

    /// `true` while values are written to the durable medium.
    pub fn is_durable(&self) -> bool {
        matches!(*self.lock(), Backend::Durable(_))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match &*self.lock() {
            Backend::Durable(medium) => read_medium(medium.as_ref(), key),
            Backend::Degraded { medium, overlay } => match overlay.get(key) {
                Some(value) => value.clone(),
                None => read_medium(medium.as_ref(), key),
            },
            Backend::Fallback(memory) => memory.get_item(key),
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        self.write(key, Some(value));
    }

    pub fn remove(&self, key: &str) {
        self.write(key, None);
    }

    /// Save `value` as JSON under `key`.
    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(e) => warn!(error = %e, key, "value not serializable; not stored"),
        }
    }

    /// Apply a set (`Some`) or remove (`None`), degrading on the first
    /// durable failure.
    fn write(&self, key: &str, value: Option<&str>) {
        let mut backend = self.lock();
        match &mut *backend {
            Backend::Durable(medium) => {
                let result = match value {
                    Some(value) => medium.set(key, value),
                    None => medium.remove(key),
                };
                let Err(e) = result else { return };
                warn!(error = %e, key, "storage write failed; keeping further writes in memory");
            }
            Backend::Degraded { overlay, .. } => {
                overlay.insert(key.to_owned(), value.map(str::to_owned));
                return;
            }
            Backend::Fallback(memory) => {
                match value {
                    Some(value) => memory.set_item(key, value),
                    None => memory.remove_item(key),
                }
                return;
            }
        }

        if let Backend::Durable(medium) = mem::replace(&mut *backend, Backend::Fallback(MemoryMedium::new())) {
            let overlay = HashMap::from([(key.to_owned(), value.map(str::to_owned))]);
            *backend = Backend::Degraded { medium, overlay };
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("durable", &self.is_durable())
            .finish()
    }
}
