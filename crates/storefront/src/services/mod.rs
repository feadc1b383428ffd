//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Demo sign-in, signup and profile updates
//! - `catalog` - Browsing and managing listings
//! - `cart` - Per-user carts
//! - `checkout` - Turning a cart into a purchase
//!
//! Services borrow [`crate::storage::Storage`] and hold no state of their
//! own. Each operation loads the whole blob for a key, changes it and
//! writes it back.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService, ProfileForm};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogQuery, CatalogService, SortOrder};
pub use checkout::{CheckoutError, CheckoutService, PurchaseSummary};
