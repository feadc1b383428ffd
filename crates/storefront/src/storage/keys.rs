//! Key layout for persisted state.

use ecofinds_core::UserId;

use super::StorageError;

/// Builds the storage keys for one application prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl StorageKeys {
    /// Default application prefix.
    pub const DEFAULT_PREFIX: &'static str = "ecofinds";

    /// Create a key layout for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` unless the prefix is non-empty and
    /// made of ASCII letters, digits, `-` and `_`.
    pub fn new(prefix: &str) -> Result<Self, StorageError> {
        if !is_valid_key(prefix) {
            return Err(StorageError::InvalidKey(prefix.to_owned()));
        }
        Ok(Self {
            prefix: prefix.to_owned(),
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registered accounts.
    #[must_use]
    pub fn users(&self) -> String {
        format!("{}_users", self.prefix)
    }

    /// Every listing, newest first.
    #[must_use]
    pub fn products(&self) -> String {
        format!("{}_products", self.prefix)
    }

    /// One user's cart.
    #[must_use]
    pub fn cart(&self, user_id: UserId) -> String {
        format!("{}_cart_{user_id}", self.prefix)
    }

    /// One user's purchase history.
    #[must_use]
    pub fn purchases(&self, user_id: UserId) -> String {
        format!("{}_purchases_{user_id}", self.prefix)
    }

    /// Whether `key` is one of this prefix's keys.
    ///
    /// Only the exact layout counts, so prefix `eco` does not claim the
    /// keys of a neighbouring `eco_app`.
    #[must_use]
    pub fn owns(&self, key: &str) -> bool {
        let Some(rest) = key
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('_'))
        else {
            return false;
        };
        matches!(rest, "users" | "products")
            || ["cart_", "purchases_"].iter().any(|kind| {
                rest.strip_prefix(kind).is_some_and(|id| {
                    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
                })
            })
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            prefix: Self::DEFAULT_PREFIX.to_owned(),
        }
    }
}

/// Keys double as file names in [`super::FileStore`].
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = StorageKeys::default();
        assert_eq!(keys.users(), "ecofinds_users");
        assert_eq!(keys.products(), "ecofinds_products");
        assert_eq!(keys.cart(UserId::new(7)), "ecofinds_cart_7");
        assert_eq!(keys.purchases(UserId::new(7)), "ecofinds_purchases_7");
    }

    #[test]
    fn test_prefix_validation() {
        assert!(StorageKeys::new("evoswap").is_ok());
        assert!(StorageKeys::new("").is_err());
        assert!(StorageKeys::new("../etc").is_err());
        assert!(StorageKeys::new("with space").is_err());
    }

    #[test]
    fn test_owns() {
        let keys = StorageKeys::new("eco").unwrap();
        assert!(keys.owns("eco_products"));
        assert!(!keys.owns("ecofinds_products"));
        assert!(!keys.owns("other_products"));
        assert!(keys.owns("eco_cart_1700000000000"));
        assert!(keys.owns("eco_purchases_7"));
    }

    #[test]
    fn test_owns_ignores_overlapping_prefixes() {
        let keys = StorageKeys::new("eco").unwrap();
        let neighbour = StorageKeys::new("eco_app").unwrap();
        for key in [
            neighbour.users(),
            neighbour.products(),
            neighbour.cart(UserId::new(3)),
            neighbour.purchases(UserId::new(3)),
        ] {
            assert!(!keys.owns(&key), "{key}");
            assert!(neighbour.owns(&key), "{key}");
        }
        assert!(!keys.owns("eco_cart_"));
        assert!(!keys.owns("eco_cart_x1"));
        assert!(!keys.owns("eco_notes"));
    }
}
