//! Checkout service.
//!
//! A purchase is a local record only: no payment, no stock reservation.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use ecofinds_core::{Price, PurchaseStatus, UserId};

use crate::models::{Cart, Purchase};
use crate::storage::{Storage, StorageError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("your cart is empty")]
    EmptyCart,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Totals shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurchaseSummary {
    pub purchase_count: usize,
    pub items_bought: u32,
    pub total_spent: Price,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    storage: &'a Storage,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Turn the user's cart into one completed purchase, then empty the cart.
    ///
    /// The purchase is written before the cart is cleared, and both happen
    /// under one storage lock.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` (recording nothing) if the cart
    /// has no items.
    #[instrument(skip(self))]
    pub fn checkout(&self, user_id: UserId) -> Result<Purchase, CheckoutError> {
        let keys = self.storage.keys();
        let cart_key = keys.cart(user_id);
        let purchases_key = keys.purchases(user_id);
        let id = self.storage.next_id();

        let txn = self.storage.begin()?;
        let cart: Cart = txn.load_or_default(&cart_key)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let purchase = Purchase {
            id,
            user_id,
            total_amount: cart.total(),
            items: cart.into_items(),
            purchase_date: Utc::now(),
            status: PurchaseStatus::Completed,
        };

        let mut purchases: Vec<Purchase> = txn.load_or_default(&purchases_key)?;
        purchases.insert(0, purchase.clone());
        txn.save(&purchases_key, &purchases)?;
        txn.save(&cart_key, &Cart::default())?;

        tracing::info!(
            purchase_id = %purchase.id,
            total = %purchase.total_amount,
            "Checkout completed"
        );
        Ok(purchase)
    }

    /// The user's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Storage` if the purchases blob cannot be read.
    pub fn purchases(&self, user_id: UserId) -> Result<Vec<Purchase>, CheckoutError> {
        Ok(self
            .storage
            .load_or_default(&self.storage.keys().purchases(user_id))?)
    }

    /// Purchase count, units bought and total spent.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Storage` if the purchases blob cannot be read.
    pub fn summary(&self, user_id: UserId) -> Result<PurchaseSummary, CheckoutError> {
        let purchases = self.purchases(user_id)?;
        Ok(PurchaseSummary {
            purchase_count: purchases.len(),
            items_bought: purchases
                .iter()
                .fold(0, |count: u32, p| count.saturating_add(p.item_count())),
            total_spent: purchases.iter().map(|p| p.total_amount).sum(),
        })
    }
}
