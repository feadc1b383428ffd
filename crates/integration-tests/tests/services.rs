//! Service-level tests against the file backend.
//!
//! These exercise what the HTTP tests cannot see: state surviving a
//! restart, key prefixes isolating apps that share a data directory, and
//! concurrent writers.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use ecofinds_core::{ProductId, ProductStatus, UserId};
use ecofinds_storefront::seed::{self, SeedData};
use ecofinds_storefront::services::{CartError, CartService, CatalogService, CheckoutService};
use ecofinds_storefront::storage::{FileStore, Storage, StorageKeys};

const JOHN: UserId = UserId::new(1);
const SARAH: UserId = UserId::new(2);
const JACKET: ProductId = ProductId::new(1);
const MACBOOK: ProductId = ProductId::new(2);

fn open(dir: &std::path::Path, prefix: &str) -> Storage {
    Storage::new(
        FileStore::open(dir).unwrap(),
        StorageKeys::new(prefix).unwrap(),
    )
}

fn seeded(dir: &std::path::Path, prefix: &str) -> Storage {
    let storage = open(dir, prefix);
    seed::seed(&storage, SeedData::demo().unwrap(), false).unwrap();
    storage
}

#[test]
fn test_state_survives_reopening_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();

    {
        let storage = seeded(dir.path(), "ecofinds");
        let cart = CartService::new(&storage);
        cart.add(JOHN, JACKET).unwrap();
        cart.add(JOHN, MACBOOK).unwrap();
        CheckoutService::new(&storage).checkout(JOHN).unwrap();
        cart.add(JOHN, JACKET).unwrap();
        CatalogService::new(&storage)
            .set_status(MACBOOK, UserId::new(3), ProductStatus::Sold)
            .unwrap();
    }

    let storage = open(dir.path(), "ecofinds");
    assert!(dir.path().join("ecofinds_users.json").exists());

    let summary = CheckoutService::new(&storage).summary(JOHN).unwrap();
    assert_eq!(summary.purchase_count, 1);
    assert_eq!(summary.items_bought, 2);
    assert_eq!(summary.total_spent.to_string(), "$735.00");

    assert_eq!(CartService::new(&storage).item_count(JOHN).unwrap(), 1);
    let macbook = CatalogService::new(&storage).get(MACBOOK).unwrap();
    assert_eq!(macbook.status, ProductStatus::Sold);

    // Reseeding without force leaves the changed catalog alone
    let report = seed::seed(&storage, SeedData::demo().unwrap(), false).unwrap();
    assert_eq!(report.users, 0);
    assert_eq!(report.products, 0);
    let macbook = CatalogService::new(&storage).get(MACBOOK).unwrap();
    assert_eq!(macbook.status, ProductStatus::Sold);
}

#[test]
fn test_prefixes_isolate_apps_sharing_a_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let shop = seeded(dir.path(), "ecofinds");
    let other = open(dir.path(), "staging");

    assert_eq!(CatalogService::new(&shop).all().unwrap().len(), 6);
    assert!(CatalogService::new(&other).all().unwrap().is_empty());

    CartService::new(&shop).add(JOHN, JACKET).unwrap();
    assert_eq!(CartService::new(&other).item_count(JOHN).unwrap(), 0);
    assert!(matches!(
        CartService::new(&other).add(JOHN, JACKET),
        Err(CartError::ProductNotFound(_))
    ));

    // Both stores list the shared directory; none of it is staging's
    let keys = other.stored_keys().unwrap();
    assert!(keys.iter().any(|key| key == "ecofinds_cart_1"));
    assert!(keys.iter().all(|key| !other.keys().owns(key)));
}

#[test]
fn test_concurrent_adds_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let storage = seeded(dir.path(), "ecofinds");

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| CartService::new(&storage).add(JOHN, JACKET).unwrap());
            scope.spawn(|| CartService::new(&storage).add(SARAH, MACBOOK).unwrap());
        }
    });

    let cart = CartService::new(&storage);
    assert_eq!(cart.item_count(JOHN).unwrap(), 8);
    assert_eq!(cart.items(JOHN).unwrap().items().len(), 1);
    assert_eq!(cart.item_count(SARAH).unwrap(), 8);
}

#[test]
fn test_checkout_snapshot_is_independent_of_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let storage = seeded(dir.path(), "ecofinds");
    let catalog = CatalogService::new(&storage);

    CartService::new(&storage).add(JOHN, JACKET).unwrap();
    let purchase = CheckoutService::new(&storage).checkout(JOHN).unwrap();
    catalog.delete(JACKET, SARAH).unwrap();

    let purchases = CheckoutService::new(&storage).purchases(JOHN).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].id, purchase.id);
    assert_eq!(purchases[0].items[0].product.title, "Vintage Leather Jacket");
    assert!(catalog.get(JACKET).is_err());
}

#[test]
fn test_cart_keeps_snapshot_of_listing_at_add_time() {
    let dir = tempfile::tempdir().unwrap();
    let storage = seeded(dir.path(), "ecofinds");

    CartService::new(&storage).add(JOHN, JACKET).unwrap();
    CatalogService::new(&storage)
        .set_status(JACKET, SARAH, ProductStatus::Inactive)
        .unwrap();

    // The line stays in the cart and can still be bought
    assert_eq!(CartService::new(&storage).item_count(JOHN).unwrap(), 1);
    let purchase = CheckoutService::new(&storage).checkout(JOHN).unwrap();
    assert_eq!(purchase.total_amount.to_string(), "$85.00");
}
