//! Listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecofinds_core::{Category, Price, ProductId, ProductStatus, UserId};

/// An item offered for sale by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: Price,
    /// Image URL. Images are never uploaded or stored locally.
    #[serde(alias = "imageUrl")]
    pub image: String,
    pub seller_id: UserId,
    /// Seller's display name at the time the listing was created.
    pub seller_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ProductStatus,
}

impl Product {
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.seller_id == user_id
    }

    /// Whether the listing shows in the catalog and can be bought.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.status.is_active()
    }

    /// Replace the editable fields and bump `updated_at`.
    pub fn apply(&mut self, listing: Listing, now: DateTime<Utc>) {
        self.title = listing.title;
        self.description = listing.description;
        self.category = listing.category;
        self.price = listing.price;
        self.image = listing.image;
        self.updated_at = now;
    }
}

/// The seller-editable part of a listing, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: Price,
    pub image: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_prototype_blob() {
        let json = r#"{
            "id": 1,
            "title": "Vintage Leather Jacket",
            "description": "Beautiful vintage leather jacket in excellent condition.",
            "category": "Clothing",
            "price": "85",
            "imageUrl": "https://images.example.com/jacket.jpeg",
            "sellerId": 2,
            "sellerName": "Sarah Wilson",
            "createdAt": "2024-12-10T00:00:00Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, Category::Clothing);
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.price, Price::from_cents(8500));
        assert!(product.is_owned_by(UserId::new(2)));
        assert!(!product.is_owned_by(UserId::new(1)));
    }
}
