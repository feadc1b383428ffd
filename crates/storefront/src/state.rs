//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{StorageBackend, StorefrontConfig};
use crate::error::AppError;
use crate::services::{AuthService, CartService, CatalogService, CheckoutService};
use crate::storage::{FileStore, Storage, StorageError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, storage and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Storage,
}

impl AppState {
    /// Create a new application state over an existing store.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Storage) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    /// Create application state, opening the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the data directory cannot be created.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StorageError> {
        let keys = config.storage.keys.clone();
        let storage = match config.storage.backend {
            StorageBackend::File => Storage::new(FileStore::open(&config.storage.data_dir)?, keys),
            StorageBackend::Memory => Storage::in_memory(keys),
        };
        Ok(Self::new(config, storage))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the key-value storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Run storage-bound work on the blocking thread pool.
    ///
    /// Backends do synchronous I/O under the storage write lock, so request
    /// handlers reach services through here instead of calling them on a
    /// runtime worker. The closure's own result is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the task panicked or was cancelled.
    pub async fn run<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Self) -> T + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state))
            .await
            .map_err(|e| AppError::Internal(format!("storage task failed: {e}")))
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.storage, &self.inner.config.auth)
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.inner.storage)
    }

    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.inner.storage)
    }

    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.inner.storage)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("storage", &self.inner.storage)
            .finish()
    }
}
