//! Key-value persistence for marketplace state.
//!
//! All state lives in JSON blobs under string keys, the server-side
//! counterpart of browser local storage:
//!
//! ```text
//! <prefix>_users                User[]
//! <prefix>_products             Product[]
//! <prefix>_cart_<userId>        CartItem[]
//! <prefix>_purchases_<userId>   Purchase[]
//! ```
//!
//! Every mutation loads the whole blob, changes it in memory and writes the
//! whole blob back. Read-modify-write cycles run under a process-wide lock
//! ([`Storage::begin`]), so concurrent requests never interleave a write.
//!
//! # Backends
//!
//! - [`FileStore`] - one `<key>.json` file per key in a data directory
//! - [`MemoryStore`] - a `HashMap`, for tests and throwaway demos

mod file;
mod ids;
mod keys;
mod memory;

pub use file::FileStore;
pub use ids::IdGenerator;
pub use keys::StorageKeys;
pub use memory::MemoryStore;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Errors raised by storage backends and the typed [`Storage`] wrapper.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored blob is not valid JSON for the expected shape.
    #[error("malformed data under key {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A writer panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A raw string key-value store.
///
/// Implementations must be safe to share across request handlers.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List all stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Typed JSON storage shared across handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    backend: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    ids: IdGenerator,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Wrap a backend, namespacing every key with `keys`.
    #[must_use]
    pub fn new(backend: impl KeyValueStore + 'static, keys: StorageKeys) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                backend: Box::new(backend),
                keys,
                ids: IdGenerator::new(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// In-memory storage with the given key prefix.
    #[must_use]
    pub fn in_memory(keys: StorageKeys) -> Self {
        Self::new(MemoryStore::new(), keys)
    }

    /// Key layout for this store.
    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.inner.keys
    }

    /// Next record id, derived from the current time in milliseconds.
    #[must_use]
    pub fn next_id<T: From<i64>>(&self) -> T {
        T::from(self.inner.ids.next())
    }

    /// Load and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Malformed` if the stored JSON does not decode
    /// as `T`, or a backend error.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        decode(self.inner.backend.as_ref(), key)
    }

    /// Load the value under `key`, or `T::default()` when absent.
    ///
    /// # Errors
    ///
    /// See [`Storage::load`].
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StorageError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Encode and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let txn = self.begin()?;
        txn.save(key, value)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let txn = self.begin()?;
        txn.remove(key)
    }

    /// All keys currently stored (including other prefixes).
    ///
    /// # Errors
    ///
    /// Returns a backend error if the key listing fails.
    pub fn stored_keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.backend.keys()
    }

    /// Take the write lock for a multi-key read-modify-write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if a previous writer panicked.
    pub fn begin(&self) -> Result<StorageTxn<'_>, StorageError> {
        let guard = self
            .inner
            .write_lock
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(StorageTxn {
            backend: self.inner.backend.as_ref(),
            _guard: guard,
        })
    }

    /// Load the value under `key` (default when absent), let `f` mutate it,
    /// and write it back if `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` (nothing is written), or a storage error
    /// converted into `E`.
    pub fn update<T, R, E, F>(&self, key: &str, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default,
        E: From<StorageError>,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let txn = self.begin()?;
        let mut value: T = txn.load_or_default(key)?;
        let result = f(&mut value)?;
        txn.save(key, &value)?;
        Ok(result)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("keys", &self.inner.keys)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to the store for the lifetime of the value.
pub struct StorageTxn<'a> {
    backend: &'a dyn KeyValueStore,
    _guard: MutexGuard<'a, ()>,
}

impl StorageTxn<'_> {
    /// See [`Storage::load`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on decode or backend failure.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        decode(self.backend, key)
    }

    /// See [`Storage::load_or_default`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on decode or backend failure.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StorageError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// See [`Storage::save`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on encode or backend failure.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.backend.set(key, &json)
    }

    /// See [`Storage::remove`].
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }
}

fn decode<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = backend.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Malformed {
            key: key.to_owned(),
            source,
        })
}
