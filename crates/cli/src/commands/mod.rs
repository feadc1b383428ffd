//! CLI command implementations.
//!
//! Every command works on the file backend directly; the storefront does
//! not need to be running.

pub mod products;
pub mod purchases;
pub mod reset;
pub mod seed;
pub mod users;

use std::path::Path;

use thiserror::Error;

use ecofinds_storefront::seed::SeedError;
use ecofinds_storefront::services::{AuthError, CatalogError, CheckoutError};
use ecofinds_storefront::storage::{FileStore, Storage, StorageError, StorageKeys};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("Could not read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Open the file store in `data_dir` with keys under `prefix`.
///
/// # Errors
///
/// Returns `StorageError` if the prefix is invalid or the directory cannot
/// be created.
pub fn open_storage(data_dir: &Path, prefix: &str) -> Result<Storage, StorageError> {
    let keys = StorageKeys::new(prefix)?;
    let backend = FileStore::open(data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), prefix, "Opened storage");
    Ok(Storage::new(backend, keys))
}
