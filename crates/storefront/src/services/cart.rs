//! Cart service.
//!
//! Each user's cart lives under its own key. Adding looks the product up in
//! the catalog under the same lock, so the snapshot stored in the cart is
//! the listing as it was at that moment.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use ecofinds_core::{Price, ProductId, UserId};

use crate::models::{Cart, Product};
use crate::storage::{Storage, StorageError};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No listing with this ID.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Sellers cannot buy their own listings.
    #[error("you cannot add your own listing to your cart")]
    OwnListing,

    /// The listing is sold or inactive.
    #[error("this item is no longer available")]
    Unavailable,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Cart service.
pub struct CartService<'a> {
    storage: &'a Storage,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The user's cart. A user who never added anything has an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart blob cannot be read.
    pub fn items(&self, user_id: UserId) -> Result<Cart, CartError> {
        Ok(self.storage.load_or_default(&self.storage.keys().cart(user_id))?)
    }

    /// Add one unit of a listing, or increment its existing line.
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound`, `CartError::OwnListing` if the
    /// user is the seller, or `CartError::Unavailable` if the listing is not
    /// active.
    #[instrument(skip(self))]
    pub fn add(&self, user_id: UserId, product_id: ProductId) -> Result<u32, CartError> {
        let keys = self.storage.keys();
        let new_id = self.storage.next_id();

        let txn = self.storage.begin()?;
        let products: Vec<Product> = txn.load_or_default(&keys.products())?;
        let product = products
            .into_iter()
            .find(|product| product.id == product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;
        if product.is_owned_by(user_id) {
            return Err(CartError::OwnListing);
        }
        if !product.is_available() {
            return Err(CartError::Unavailable);
        }

        let cart_key = keys.cart(user_id);
        let mut cart: Cart = txn.load_or_default(&cart_key)?;
        let quantity = cart.add(product, new_id, Utc::now());
        txn.save(&cart_key, &cart)?;

        tracing::debug!(quantity, "Added to cart");
        Ok(quantity)
    }

    /// Remove a product's line. Removing something not in the cart is a
    /// no-op. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` on storage failure.
    #[instrument(skip(self))]
    pub fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool, CartError> {
        self.modify(user_id, |cart| cart.remove(product_id))
    }

    /// Set a line's quantity; zero removes it. Returns whether a line
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` on storage failure.
    #[instrument(skip(self))]
    pub fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, CartError> {
        self.modify(user_id, |cart| cart.set_quantity(product_id, quantity))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` on storage failure.
    pub fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        Ok(self.storage.save(&self.storage.keys().cart(user_id), &Cart::default())?)
    }

    /// Sum of price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart blob cannot be read.
    pub fn total(&self, user_id: UserId) -> Result<Price, CartError> {
        Ok(self.items(user_id)?.total())
    }

    /// Sum of quantities, shown on the header badge.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart blob cannot be read.
    pub fn item_count(&self, user_id: UserId) -> Result<u32, CartError> {
        Ok(self.items(user_id)?.item_count())
    }

    /// Apply `f` to the cart under the lock, writing back only when it
    /// reports a change.
    fn modify(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut Cart) -> bool,
    ) -> Result<bool, CartError> {
        let key = self.storage.keys().cart(user_id);
        let txn = self.storage.begin()?;
        let mut cart: Cart = txn.load_or_default(&key)?;
        let changed = f(&mut cart);
        if changed {
            txn.save(&key, &cart)?;
        }
        Ok(changed)
    }
}
