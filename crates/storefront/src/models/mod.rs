//! Domain records persisted in storage.
//!
//! Field names serialize in camelCase, matching the JSON blobs written by
//! the browser prototypes, so existing exports load unchanged.

pub mod cart;
pub mod product;
pub mod purchase;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use product::{Listing, Product};
pub use purchase::Purchase;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{ProfileUpdate, User};
