//! Demo data seeding.
//!
//! Seed files are YAML with a `users` list and a `products` list. The
//! bundled demo set ([`DEMO_SEED`]) is written on startup when
//! `ECOFINDS_SEED_DEMO_DATA` is on and by `ef-cli seed`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use ecofinds_core::{
    Category, Email, EmailError, Price, ProductId, ProductStatus, UserId, Username,
    UsernameError,
};

use crate::models::{Product, User};
use crate::storage::{Storage, StorageError};

/// The bundled demo users and listings.
pub const DEMO_SEED: &str = include_str!("../seed/demo.yaml");

/// Errors that can occur while loading or writing seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("seed user {id}: {source}")]
    InvalidEmail {
        id: i64,
        #[source]
        source: EmailError,
    },

    #[error("seed user {id}: {source}")]
    InvalidUsername {
        id: i64,
        #[source]
        source: UsernameError,
    },

    #[error("seed product {product} references unknown seller {seller}")]
    UnknownSeller { product: i64, seller: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub joined: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: Price,
    pub image: String,
    pub seller_id: i64,
    #[serde(default)]
    pub status: ProductStatus,
    pub listed: NaiveDate,
}

/// How many records a seed run wrote. Zero means the key already had data
/// and was left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

impl SeedData {
    /// Parse the bundled demo set.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the bundled file is malformed.
    pub fn demo() -> Result<Self, SeedError> {
        Self::from_yaml(DEMO_SEED)
    }

    /// Parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the input is not a valid seed document.
    pub fn from_yaml(input: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Validate and convert into storage records. Products come back newest
    /// first, each carrying its seller's display name.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` for invalid emails or usernames, and for products
    /// whose seller is not in `existing` or this seed's users.
    pub fn into_records(self, existing: &[User]) -> Result<(Vec<User>, Vec<Product>), SeedError> {
        let users = self
            .users
            .into_iter()
            .map(SeedUser::into_user)
            .collect::<Result<Vec<_>, _>>()?;

        let mut products = self
            .products
            .into_iter()
            .map(|seed| -> Result<Product, SeedError> {
                let seller = users
                    .iter()
                    .chain(existing)
                    .find(|user| user.id.as_i64() == seed.seller_id)
                    .ok_or(SeedError::UnknownSeller {
                        product: seed.id,
                        seller: seed.seller_id,
                    })?;
                Ok(seed.into_product(seller))
            })
            .collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok((users, products))
    }
}

impl SeedUser {
    fn into_user(self) -> Result<User, SeedError> {
        let id = self.id;
        Ok(User {
            id: UserId::new(id),
            email: Email::parse(&self.email)
                .map_err(|source| SeedError::InvalidEmail { id, source })?,
            username: Username::parse(&self.username)
                .map_err(|source| SeedError::InvalidUsername { id, source })?,
            full_name: self.full_name,
            phone: self.phone,
            address: self.address,
            avatar: self.avatar,
            created_at: start_of_day(self.joined),
        })
    }
}

impl SeedProduct {
    fn into_product(self, seller: &User) -> Product {
        let listed = start_of_day(self.listed);
        Product {
            id: ProductId::new(self.id),
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            image: self.image,
            seller_id: seller.id,
            seller_name: seller.display_name().to_owned(),
            created_at: listed,
            updated_at: listed,
            status: self.status,
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Write seed records into storage.
///
/// Without `force`, a key that already holds records is left untouched, so
/// this is safe to run on every startup. With `force`, the users and
/// products blobs are replaced outright.
///
/// # Errors
///
/// Returns `SeedError` if the data is invalid or storage fails.
pub fn seed(storage: &Storage, data: SeedData, force: bool) -> Result<SeedReport, SeedError> {
    let keys = storage.keys();
    let txn = storage.begin()?;

    let existing_users: Vec<User> = txn.load_or_default(&keys.users())?;
    let existing_products: Vec<Product> = txn.load_or_default(&keys.products())?;
    let (users, products) = data.into_records(&existing_users)?;

    let mut report = SeedReport::default();
    if force || existing_users.is_empty() {
        txn.save(&keys.users(), &users)?;
        report.users = users.len();
    }
    if force || existing_products.is_empty() {
        txn.save(&keys.products(), &products)?;
        report.products = products.len();
    }

    tracing::info!(
        users = report.users,
        products = report.products,
        "Seed data applied"
    );
    Ok(report)
}
