//! Catalog service: browsing and seller-side listing management.

mod form;
mod query;

pub use form::{DESCRIPTION_MIN_LENGTH, FieldErrors, ListingForm, TITLE_MIN_LENGTH};
pub(crate) use form::is_web_url;
pub use query::{CatalogQuery, SortOrder, filter_and_sort};

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use ecofinds_core::{ProductId, ProductStatus, UserId};

use crate::models::{Listing, Product};
use crate::storage::{Storage, StorageError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No listing with this ID.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The listing belongs to another seller.
    #[error("only the seller can change this listing")]
    NotOwner,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Catalog service.
pub struct CatalogService<'a> {
    storage: &'a Storage,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every listing in storage order (newest first), any status.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the products blob cannot be read.
    pub fn all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.storage.load_or_default(&self.storage.keys().products())?)
    }

    /// Active listings matching `query`. No matches is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the products blob cannot be read.
    #[instrument(skip(self))]
    pub fn browse(&self, query: &CatalogQuery) -> Result<Vec<Product>, CatalogError> {
        Ok(filter_and_sort(self.all()?, query))
    }

    /// Look up one listing, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no listing has this ID.
    pub fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.all()?
            .into_iter()
            .find(|product| product.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    /// A seller's listings in every status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the products blob cannot be read.
    pub fn listings_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, CatalogError> {
        let mut listings: Vec<Product> = self
            .all()?
            .into_iter()
            .filter(|product| product.is_owned_by(seller_id))
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listings)
    }

    /// Publish a new active listing at the front of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the products blob cannot be written.
    #[instrument(skip(self, listing), fields(title = %listing.title))]
    pub fn create(
        &self,
        seller_id: UserId,
        seller_name: &str,
        listing: Listing,
    ) -> Result<Product, CatalogError> {
        let now = Utc::now();
        let product = Product {
            id: self.storage.next_id(),
            title: listing.title,
            description: listing.description,
            category: listing.category,
            price: listing.price,
            image: listing.image,
            seller_id,
            seller_name: seller_name.to_owned(),
            created_at: now,
            updated_at: now,
            status: ProductStatus::Active,
        };

        let key = self.storage.keys().products();
        self.storage
            .update(&key, |products: &mut Vec<Product>| {
                products.insert(0, product.clone());
                Ok::<_, CatalogError>(())
            })?;

        tracing::info!(product_id = %product.id, "Listing created");
        Ok(product)
    }

    /// Replace the editable fields of a listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` or `CatalogError::NotOwner`.
    #[instrument(skip(self, listing))]
    pub fn update(
        &self,
        id: ProductId,
        seller_id: UserId,
        listing: Listing,
    ) -> Result<Product, CatalogError> {
        self.modify(id, seller_id, |product| product.apply(listing, Utc::now()))
    }

    /// Mark a listing sold, take it down, or put it back up.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` or `CatalogError::NotOwner`.
    #[instrument(skip(self))]
    pub fn set_status(
        &self,
        id: ProductId,
        seller_id: UserId,
        status: ProductStatus,
    ) -> Result<Product, CatalogError> {
        self.modify(id, seller_id, |product| {
            product.status = status;
            product.updated_at = Utc::now();
        })
    }

    /// Delete a listing. Carts and purchases that reference it keep their
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` or `CatalogError::NotOwner`.
    #[instrument(skip(self))]
    pub fn delete(&self, id: ProductId, seller_id: UserId) -> Result<(), CatalogError> {
        let key = self.storage.keys().products();
        self.storage.update(&key, |products: &mut Vec<Product>| {
            let index = products
                .iter()
                .position(|product| product.id == id)
                .ok_or(CatalogError::NotFound(id))?;
            if products.get(index).is_some_and(|p| !p.is_owned_by(seller_id)) {
                return Err(CatalogError::NotOwner);
            }
            products.remove(index);
            Ok(())
        })?;

        tracing::info!(product_id = %id, "Listing deleted");
        Ok(())
    }

    fn modify<F>(&self, id: ProductId, seller_id: UserId, f: F) -> Result<Product, CatalogError>
    where
        F: FnOnce(&mut Product),
    {
        let key = self.storage.keys().products();
        self.storage.update(&key, |products: &mut Vec<Product>| {
            let product = products
                .iter_mut()
                .find(|product| product.id == id)
                .ok_or(CatalogError::NotFound(id))?;
            if !product.is_owned_by(seller_id) {
                return Err(CatalogError::NotOwner);
            }
            f(product);
            Ok(product.clone())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecofinds_core::{Category, CategoryFilter, Price};

    use super::*;
    use crate::storage::StorageKeys;

    const SELLER: UserId = UserId::new(2);
    const OTHER: UserId = UserId::new(3);

    fn listing(title: &str, category: Category, cents: i64) -> Listing {
        Listing {
            title: title.to_string(),
            description: format!("{title}, gently used"),
            category,
            price: Price::from_cents(cents),
            image: "https://images.example.com/item.jpeg".to_string(),
        }
    }

    fn storage() -> Storage {
        Storage::in_memory(StorageKeys::default())
    }

    #[test]
    fn test_create_prepends_active_listing() {
        let storage = storage();
        let catalog = CatalogService::new(&storage);

        let first = catalog
            .create(SELLER, "sarah_wilson", listing("Jacket", Category::Clothing, 8500))
            .unwrap();
        let second = catalog
            .create(SELLER, "sarah_wilson", listing("Lamp", Category::Furniture, 2000))
            .unwrap();

        assert_eq!(second.status, ProductStatus::Active);
        assert_eq!(second.seller_name, "sarah_wilson");
        let all = catalog.all().unwrap();
        assert_eq!(all.first().unwrap().id, second.id);
        assert_eq!(all.last().unwrap().id, first.id);
        assert_eq!(catalog.get(first.id).unwrap(), first);
    }

    #[test]
    fn test_only_owner_can_edit_or_delete() {
        let storage = storage();
        let catalog = CatalogService::new(&storage);
        let product = catalog
            .create(SELLER, "sarah_wilson", listing("Jacket", Category::Clothing, 8500))
            .unwrap();

        let edit = listing("Stolen Jacket", Category::Clothing, 1);
        assert!(matches!(
            catalog.update(product.id, OTHER, edit.clone()),
            Err(CatalogError::NotOwner)
        ));
        assert!(matches!(
            catalog.delete(product.id, OTHER),
            Err(CatalogError::NotOwner)
        ));
        assert!(matches!(
            catalog.set_status(product.id, OTHER, ProductStatus::Sold),
            Err(CatalogError::NotOwner)
        ));
        assert_eq!(catalog.get(product.id).unwrap().title, "Jacket");

        let updated = catalog.update(product.id, SELLER, edit).unwrap();
        assert_eq!(updated.title, "Stolen Jacket");
        assert!(updated.updated_at >= product.updated_at);
        assert_eq!(updated.created_at, product.created_at);

        catalog.delete(product.id, SELLER).unwrap();
        assert!(matches!(
            catalog.get(product.id),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_changes_hide_from_browse() {
        let storage = storage();
        let catalog = CatalogService::new(&storage);
        let product = catalog
            .create(SELLER, "sarah_wilson", listing("Jacket", Category::Clothing, 8500))
            .unwrap();

        catalog
            .set_status(product.id, SELLER, ProductStatus::Sold)
            .unwrap();
        assert!(catalog.browse(&CatalogQuery::default()).unwrap().is_empty());
        assert_eq!(catalog.listings_by_seller(SELLER).unwrap().len(), 1);

        catalog
            .set_status(product.id, SELLER, ProductStatus::Active)
            .unwrap();
        assert_eq!(catalog.browse(&CatalogQuery::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_browse_filters_by_category() {
        let storage = storage();
        let catalog = CatalogService::new(&storage);
        catalog
            .create(SELLER, "sarah_wilson", listing("Jacket", Category::Clothing, 8500))
            .unwrap();
        catalog
            .create(OTHER, "mike_j", listing("Laptop", Category::Electronics, 65_000))
            .unwrap();

        let books = CatalogQuery {
            category: CategoryFilter::Only(Category::Books),
            ..CatalogQuery::default()
        };
        assert!(catalog.browse(&books).unwrap().is_empty());
        assert_eq!(catalog.listings_by_seller(OTHER).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_listing() {
        let storage = storage();
        let catalog = CatalogService::new(&storage);
        let id = ProductId::new(42);
        assert!(matches!(catalog.get(id), Err(CatalogError::NotFound(_))));
        assert!(matches!(
            catalog.delete(id, SELLER),
            Err(CatalogError::NotFound(_))
        ));
    }
}
