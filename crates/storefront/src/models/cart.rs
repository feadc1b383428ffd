//! Shopping cart records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecofinds_core::{CartItemId, Price, ProductId};

use super::Product;

/// One line in a cart: a snapshot of the product plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    /// Always equal to `product.id`.
    product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// A new line holding one unit of `product`.
    #[must_use]
    pub fn new(id: CartItemId, product: Product, added_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product_id: product.id,
            product,
            quantity: 1,
            added_at,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// A user's cart, stored as a plain JSON array of [`CartItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<CartItem>);

impl Cart {
    /// Most units of one listing a cart line can hold.
    pub const MAX_QUANTITY: u32 = 99;

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.iter().any(|item| item.product_id == product_id)
    }

    /// Add one unit of `product`. An existing line for the same product is
    /// incremented instead of duplicated; `new_id` is only used for a new
    /// line. A line already at [`Cart::MAX_QUANTITY`] stays there. Returns
    /// the resulting quantity.
    pub fn add(&mut self, product: Product, new_id: CartItemId, now: DateTime<Utc>) -> u32 {
        if let Some(item) = self.0.iter_mut().find(|item| item.product_id == product.id) {
            item.quantity = item.quantity.saturating_add(1).min(Self::MAX_QUANTITY);
            return item.quantity;
        }
        self.0.push(CartItem::new(new_id, product, now));
        1
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| item.product_id != product_id);
        self.0.len() != before
    }

    /// Set the quantity for `product_id`, capped at [`Cart::MAX_QUANTITY`];
    /// zero removes the line. Returns whether a line matched.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.0.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity.min(Self::MAX_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.0.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        count_units(&self.0)
    }
}

/// Sum of quantities, saturating so hand-edited blobs cannot overflow.
pub(crate) fn count_units(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0, |count: u32, item| count.saturating_add(item.quantity))
}
