//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Browse listings (q, category, sort)
//!
//! # Products
//! GET  /products/new           - Add listing form (auth)
//! POST /products               - Create listing (auth)
//! GET  /products/{id}          - Product detail
//! POST /products/{id}          - Update listing (auth, owner)
//! GET  /products/{id}/edit     - Edit listing form (auth, owner)
//! POST /products/{id}/status   - Mark sold / deactivate / reactivate (auth, owner)
//! POST /products/{id}/delete   - Delete listing (auth, owner)
//! GET  /listings               - My listings (auth)
//!
//! # Cart
//! GET  /cart                   - Cart page (auth)
//! POST /cart/add               - Add product (auth)
//! POST /cart/update            - Set quantity (auth)
//! POST /cart/remove            - Remove product (auth)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Purchase the cart (auth)
//! GET  /purchases              - Purchase history (auth)
//!
//! # Account
//! GET  /dashboard              - Profile and stats (auth)
//! POST /dashboard              - Update profile (auth)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod home;
pub mod listings;
pub mod products;
pub mod purchases;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use ecofinds_core::ProductStatus;

use crate::error::Result;
use crate::middleware::auth_rate_limiter;
use crate::models::{CurrentUser, Product};
use crate::state::AppState;

// =============================================================================
// Shared View Types
// =============================================================================

/// Header state shared by every full page.
#[derive(Clone, Default)]
pub struct NavView {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
}

impl NavView {
    /// Build the header for `user`, counting their cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read.
    pub async fn load(state: &AppState, user: Option<CurrentUser>) -> Result<Self> {
        let cart_count = match &user {
            Some(user) => {
                let user_id = user.id;
                state.run(move |s| s.cart().item_count(user_id)).await??
            }
            None => 0,
        };
        Ok(Self { user, cart_count })
    }

    /// Header for a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read.
    pub async fn signed_in(state: &AppState, user: &CurrentUser) -> Result<Self> {
        Self::load(state, Some(user.clone())).await
    }
}

/// Query parameters for error/success display after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// One-shot banner shown after a redirect.
///
/// Only known codes produce a message; anything else in the query string is
/// ignored rather than echoed into the page.
#[derive(Clone, Default)]
pub struct Flash {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl Flash {
    #[must_use]
    pub fn from_query(query: &MessageQuery) -> Self {
        Self {
            error: query.error.as_deref().and_then(error_message),
            success: query.success.as_deref().and_then(success_message),
        }
    }
}

fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "credentials" => "Invalid email or password.",
        "invalid_email" => "Please enter a valid email address.",
        "invalid_username" => {
            "Usernames are 3 to 30 characters: letters, numbers and underscores."
        }
        "password_required" => "Please choose a password.",
        "password_mismatch" => "Passwords do not match.",
        "email_taken" => "An account with this email already exists.",
        "username_taken" => "That username is already taken.",
        "own_listing" => "You can't add your own listing to your cart.",
        "unavailable" => "This item is no longer available.",
        "not_found" => "That item no longer exists.",
        "empty_cart" => "Your cart is empty.",
        _ => return None,
    };
    Some(message)
}

fn success_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "registered" => "Welcome to EcoFinds! Your account is ready.",
        "logged_out" => "You have been signed out.",
        "added" => "Added to your cart.",
        "updated" => "Cart updated.",
        "removed" => "Removed from your cart.",
        "purchased" => "Purchase complete. Thank you for shopping second-hand!",
        "created" => "Your listing is live.",
        "saved" => "Listing saved.",
        "deleted" => "Listing deleted.",
        "status" => "Listing status updated.",
        "profile" => "Profile updated.",
        _ => return None,
    };
    Some(message)
}

/// Listing summary for grids and tables.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: &'static str,
    pub price: String,
    pub image: String,
    pub seller_name: String,
    pub status: &'static str,
    pub is_active: bool,
    pub listed: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: excerpt(&product.description, 100),
            category: product.category.name(),
            price: product.price.to_string(),
            image: product.image.clone(),
            seller_name: product.seller_name.clone(),
            status: status_label(product.status),
            is_active: product.status.is_active(),
            listed: format_date(&product.created_at),
        }
    }
}

/// `<select>` option with its selection state worked out in Rust.
#[derive(Clone)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Dates as shown on the site, e.g. `Mar 4, 2024`.
#[must_use]
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

#[must_use]
pub const fn status_label(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Active => "Active",
        ProductStatus::Sold => "Sold",
        ProductStatus::Inactive => "Inactive",
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Only same-site paths may be used as a post-login destination.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create))
        .route("/new", get(products::new_form))
        .route("/{id}", get(products::show).post(products::update))
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/status", post(products::set_status))
        .route("/{id}/delete", post(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
///
/// With `rate_limit_auth`, the `/auth` routes are throttled per client IP.
pub fn routes(rate_limit_auth: bool) -> Router<AppState> {
    let auth = if rate_limit_auth {
        auth_routes().layer(auth_rate_limiter())
    } else {
        auth_routes()
    };

    Router::new()
        .route("/", get(home::browse))
        .nest("/products", product_routes())
        .route("/listings", get(listings::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/purchases", get(purchases::index))
        .route("/dashboard", get(dashboard::show).post(dashboard::update))
        .nest("/auth", auth)
}
