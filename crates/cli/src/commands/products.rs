//! Listing inspection.

use tracing::info;

use ecofinds_core::UserId;
use ecofinds_storefront::services::CatalogService;
use ecofinds_storefront::storage::Storage;

use super::CliError;

/// Log listings, optionally only one seller's.
///
/// # Errors
///
/// Returns an error if the products blob cannot be read.
pub fn list(storage: &Storage, seller: Option<UserId>) -> Result<(), CliError> {
    let catalog = CatalogService::new(storage);
    let products = match seller {
        Some(seller_id) => catalog.listings_by_seller(seller_id)?,
        None => catalog.all()?,
    };

    info!("Products ({})", products.len());
    info!("=============");
    for product in &products {
        info!(
            "  {:>14}  {:<32} {:>10}  {:<14} {:<8} seller {} ({})",
            product.id,
            product.title,
            product.price.to_string(),
            product.category.name(),
            product.status.as_str(),
            product.seller_id,
            product.seller_name
        );
    }
    Ok(())
}
