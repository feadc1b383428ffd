//! Integration tests for browsing, the cart and checkout.
//!
//! Demo data: john (user 1) sells nothing, sarah (user 2) sells the
//! Vintage Leather Jacket (product 1, $85), mike (user 3) sells the
//! MacBook Air 2020 (product 2, $650).

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use ecofinds_core::UserId;
use ecofinds_integration_tests::TestApp;

const JOHN: &str = "john@example.com";
const SARAH: &str = "sarah@example.com";

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::seeded();
    let mut browser = app.browser();

    let live = browser.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = browser.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

// =============================================================================
// Browse
// =============================================================================

#[tokio::test]
async fn test_home_lists_every_active_listing() {
    let app = TestApp::seeded();
    let page = app.browser().get("/").await;

    assert_eq!(page.status, StatusCode::OK);
    for title in [
        "Vintage Leather Jacket",
        "MacBook Air 2020",
        "Wooden Coffee Table",
        "Trek Mountain Bike",
        "Classic Fiction Book Set",
        "Ceramic Plant Pots Set",
    ] {
        assert!(page.body.contains(title), "missing {title}");
    }
}

#[tokio::test]
async fn test_browse_filters_by_category() {
    let app = TestApp::seeded();
    let page = app.browser().get("/?category=Electronics").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("MacBook Air 2020"));
    assert!(!page.body.contains("Vintage Leather Jacket"));
    assert!(!page.body.contains("Trek Mountain Bike"));
}

#[tokio::test]
async fn test_browse_search_matches_title_and_description() {
    let app = TestApp::seeded();
    let mut browser = app.browser();

    let by_title = browser.get("/?q=LEATHER").await;
    assert!(by_title.body.contains("Vintage Leather Jacket"));
    assert!(!by_title.body.contains("MacBook Air 2020"));

    // "trails" only appears in the bike's description
    let by_description = browser.get("/?q=trails").await;
    assert!(by_description.body.contains("Trek Mountain Bike"));
    assert!(!by_description.body.contains("Wooden Coffee Table"));
}

#[tokio::test]
async fn test_browse_unknown_filters_fall_back_to_everything() {
    let app = TestApp::seeded();
    let page = app
        .browser()
        .get("/?category=Spaceships&sort=random")
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("MacBook Air 2020"));
    assert!(page.body.contains("Ceramic Plant Pots Set"));
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let app = TestApp::seeded();
    let mut browser = app.browser();

    let page = browser.get("/products/1").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Vintage Leather Jacket"));
    assert!(page.body.contains("Sarah Wilson"));
    assert!(page.body.contains("$85.00"));

    let missing = browser.get("/products/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_requires_login() {
    let app = TestApp::seeded();
    let mut browser = app.browser();

    browser
        .get("/cart")
        .await
        .assert_redirect("/auth/login?next=%2Fcart");

    let count = browser.get("/cart/count").await;
    assert_eq!(count.status, StatusCode::OK);
    assert!(count.body.contains(">0<"));
}

#[tokio::test]
async fn test_add_update_and_remove_cart_items() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;

    john.post("/cart/add", &[("product_id", "1")])
        .await
        .assert_redirect("/cart?success=added");
    john.post("/cart/add", &[("product_id", "1")])
        .await
        .assert_redirect("/cart?success=added");
    john.post("/cart/add", &[("product_id", "2")])
        .await
        .assert_redirect("/cart?success=added");

    let cart = john.get("/cart?success=added").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("Added to your cart."));
    assert!(cart.body.contains("Vintage Leather Jacket"));
    assert!(cart.body.contains("MacBook Air 2020"));
    // 2 x $85 + $650
    assert!(cart.body.contains("$820.00"));
    assert_eq!(app.state.cart().item_count(UserId::new(1)).unwrap(), 3);

    john.post("/cart/update", &[("product_id", "1"), ("quantity", "1")])
        .await
        .assert_redirect("/cart?success=updated");
    assert_eq!(app.state.cart().item_count(UserId::new(1)).unwrap(), 2);

    john.post("/cart/update", &[("product_id", "2"), ("quantity", "0")])
        .await
        .assert_redirect("/cart?success=removed");
    john.post("/cart/remove", &[("product_id", "1")])
        .await
        .assert_redirect("/cart?success=removed");
    assert!(app.state.cart().items(UserId::new(1)).unwrap().is_empty());
}

#[tokio::test]
async fn test_cannot_add_own_listing() {
    let app = TestApp::seeded();
    let mut sarah = app.signed_in(SARAH).await;

    sarah
        .post("/cart/add", &[("product_id", "1")])
        .await
        .assert_redirect("/products/1?error=own_listing");
    assert_eq!(app.state.cart().item_count(UserId::new(2)).unwrap(), 0);
}

#[tokio::test]
async fn test_cannot_add_missing_product() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;

    john.post("/cart/add", &[("product_id", "999")])
        .await
        .assert_redirect("/?error=not_found");
}

#[tokio::test]
async fn test_cart_count_fragment_for_signed_in_user() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;
    john.post("/cart/add", &[("product_id", "3")]).await;
    john.post("/cart/add", &[("product_id", "3")]).await;

    let count = john.get("/cart/count").await;
    assert_eq!(count.status, StatusCode::OK);
    assert!(count.body.contains(">2<"));
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_records_purchase_and_empties_cart() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;
    john.post("/cart/add", &[("product_id", "1")]).await;
    john.post("/cart/add", &[("product_id", "2")]).await;

    john.post("/checkout", &[])
        .await
        .assert_redirect("/purchases?success=purchased");

    let john_id = UserId::new(1);
    assert!(app.state.cart().items(john_id).unwrap().is_empty());
    let purchases = app.state.checkout().purchases(john_id).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].items.len(), 2);
    assert_eq!(purchases[0].total_amount.to_string(), "$735.00");

    let history = john.get("/purchases").await;
    assert_eq!(history.status, StatusCode::OK);
    assert!(history.body.contains("Vintage Leather Jacket"));
    assert!(history.body.contains("$735.00"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_records_nothing() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;

    john.post("/checkout", &[])
        .await
        .assert_redirect("/cart?error=empty_cart");
    assert!(
        app.state
            .checkout()
            .purchases(UserId::new(1))
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_purchases_keep_snapshot_after_listing_changes() {
    let app = TestApp::seeded();
    let mut john = app.signed_in(JOHN).await;
    john.post("/cart/add", &[("product_id", "1")]).await;
    john.post("/checkout", &[]).await;

    let mut sarah = app.signed_in(SARAH).await;
    sarah
        .post("/products/1/delete", &[])
        .await
        .assert_redirect("/listings?success=deleted");

    let history = john.get("/purchases").await;
    assert!(history.body.contains("Vintage Leather Jacket"));
    assert!(history.body.contains("$85.00"));
}

#[tokio::test]
async fn test_largest_order_checks_out_without_breaking_storage() {
    let app = TestApp::seeded();
    let mut sarah = app.signed_in(SARAH).await;

    let listing = |price: &'static str| {
        [
            ("title", "Grand Piano"),
            ("description", "Concert grand, recently tuned and restored."),
            ("category", "Home & Garden"),
            ("price", price),
            ("image", "https://images.example.com/piano.jpeg"),
        ]
    };

    let rejected = sarah
        .post("/products", &listing("79228162514264337593543950335"))
        .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected.body.contains("Price must be at most"));

    let created = sarah.post("/products", &listing("1000000")).await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    let piano = created
        .location
        .as_deref()
        .and_then(|l| l.strip_prefix("/products/"))
        .and_then(|l| l.strip_suffix("?success=created"))
        .unwrap()
        .to_owned();

    let mut john = app.signed_in(JOHN).await;
    john.post("/cart/add", &[("product_id", piano.as_str())]).await;
    john.post("/cart/add", &[("product_id", "1")]).await;
    john.post(
        "/cart/update",
        &[("product_id", piano.as_str()), ("quantity", "4294967295")],
    )
    .await
    .assert_redirect("/cart?success=updated");

    let cart = john.get("/cart").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("$99000085.00"));

    john.post("/checkout", &[])
        .await
        .assert_redirect("/purchases?success=purchased");
    let purchases = app.state.checkout().purchases(UserId::new(1)).unwrap();
    assert_eq!(purchases[0].item_count(), 100);

    // Other shoppers are unaffected
    let mut mike = app.signed_in("mike@example.com").await;
    mike.post("/cart/add", &[("product_id", "1")])
        .await
        .assert_redirect("/cart?success=added");
}
