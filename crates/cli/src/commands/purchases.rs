//! Purchase history inspection.

use tracing::info;

use ecofinds_core::UserId;
use ecofinds_storefront::services::CheckoutService;
use ecofinds_storefront::storage::Storage;

use super::CliError;

/// Log a user's purchases with their lines.
///
/// # Errors
///
/// Returns an error if the purchases blob cannot be read.
pub fn list(storage: &Storage, user_id: UserId) -> Result<(), CliError> {
    let checkout = CheckoutService::new(storage);
    let purchases = checkout.purchases(user_id)?;
    let summary = checkout.summary(user_id)?;

    info!("Purchases for user {user_id}");
    info!("=======================");
    for purchase in &purchases {
        info!(
            "  #{}  {}  {}  {}",
            purchase.id,
            purchase.purchase_date.format("%Y-%m-%d %H:%M"),
            purchase.status,
            purchase.total_amount
        );
        for item in &purchase.items {
            info!("      {} x {}", item.quantity, item.product.title);
        }
    }
    info!(
        "Total: {} purchases, {} items, {} spent",
        summary.purchase_count, summary.items_bought, summary.total_spent
    );
    Ok(())
}
