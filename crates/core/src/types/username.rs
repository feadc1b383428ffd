//! Public handle shown as the seller name on listings.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is a valid regex"));

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username is required")]
    Empty,
    #[error("username must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
    #[error("username may only contain letters, digits and underscores")]
    InvalidCharacters,
}

/// A username such as `john_eco`.
///
/// Usernames are unique across accounts (compared case-insensitively) and
/// are copied onto each listing as its seller name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 30;

    /// Parse a username, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the input is empty, outside the length
    /// bounds, or contains characters other than ASCII letters, digits and `_`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }
        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(UsernameError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if !USERNAME_PATTERN.is_match(s) {
            return Err(UsernameError::InvalidCharacters);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for the uniqueness check.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Username::parse(" john_eco ").unwrap().as_str(), "john_eco");
        assert!(Username::parse("abc").is_ok());
    }

    #[test]
    fn test_parse_length_bounds() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert!(matches!(
            Username::parse("ab"),
            Err(UsernameError::Length { .. })
        ));
        assert!(matches!(
            Username::parse(&"a".repeat(31)),
            Err(UsernameError::Length { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_symbols() {
        assert_eq!(
            Username::parse("john-eco"),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::parse("john eco"),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_same_as_ignores_case() {
        let a = Username::parse("John_Eco").unwrap();
        let b = Username::parse("john_eco").unwrap();
        assert!(a.same_as(&b));
        assert_ne!(a, b);
    }
}
