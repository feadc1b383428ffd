//! EcoFinds Core - Shared types library.
//!
//! This crate provides common types used across all EcoFinds components:
//! - `storefront` - The marketplace web application
//! - `cli` - Command-line tools for seeding and inspecting stored data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, usernames,
//!   categories and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
