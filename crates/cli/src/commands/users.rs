//! Account listing.

use tracing::info;

use ecofinds_storefront::config::AuthConfig;
use ecofinds_storefront::services::AuthService;
use ecofinds_storefront::storage::Storage;

use super::CliError;

/// Log every registered user.
///
/// # Errors
///
/// Returns an error if the users blob cannot be read.
pub fn list(storage: &Storage) -> Result<(), CliError> {
    let config = AuthConfig::default();
    let users = AuthService::new(storage, &config).list()?;

    info!("Users ({})", users.len());
    info!("==========");
    for user in &users {
        info!(
            "  {:>14}  {:<20} {:<28} {}",
            user.id,
            user.username.as_str(),
            user.email.as_str(),
            user.display_name()
        );
    }
    Ok(())
}
