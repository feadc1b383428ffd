//! Completed checkouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecofinds_core::{Price, PurchaseId, PurchaseStatus, UserId};

use super::CartItem;
use super::cart::count_units;

/// An immutable record of one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    /// Cart lines as they were at checkout.
    pub items: Vec<CartItem>,
    pub total_amount: Price,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub status: PurchaseStatus,
}

impl Purchase {
    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        count_units(&self.items)
    }
}
