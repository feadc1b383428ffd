//! Seed users and listings.

use std::path::Path;

use tracing::info;

use ecofinds_storefront::seed::{self, SeedData};
use ecofinds_storefront::storage::Storage;

use super::CliError;

/// Seed from `file`, or from the bundled demo data.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, references an
/// unknown seller, or storage fails.
pub fn run(storage: &Storage, file: Option<&Path>, force: bool) -> Result<(), CliError> {
    let data = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading seed file");
            let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            SeedData::from_yaml(&content)?
        }
        None => SeedData::demo()?,
    };

    let report = seed::seed(storage, data, force)?;

    info!("Seeding complete!");
    info!("  Users written: {}", report.users);
    info!("  Products written: {}", report.products);
    if report.users == 0 && report.products == 0 && !force {
        info!("Storage already has data; pass --force to overwrite it");
    }
    Ok(())
}
