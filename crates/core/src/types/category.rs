//! Listing categories.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a category name is not one of [`Category::ALL`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// The closed set of listing categories.
///
/// Serialized with the display name (`"Home & Garden"`), which is also the
/// value used in form fields and query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Clothing,
    #[serde(rename = "Home & Garden")]
    HomeAndGarden,
    Sports,
    Books,
    Furniture,
    Vehicles,
    Jewelry,
    Toys,
    Music,
    Art,
    Others,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Electronics,
        Self::Clothing,
        Self::HomeAndGarden,
        Self::Sports,
        Self::Books,
        Self::Furniture,
        Self::Vehicles,
        Self::Jewelry,
        Self::Toys,
        Self::Music,
        Self::Art,
        Self::Others,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::HomeAndGarden => "Home & Garden",
            Self::Sports => "Sports",
            Self::Books => "Books",
            Self::Furniture => "Furniture",
            Self::Vehicles => "Vehicles",
            Self::Jewelry => "Jewelry",
            Self::Toys => "Toys",
            Self::Music => "Music",
            Self::Art => "Art",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// Category selection on the browse page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Label of the "no filter" option.
    pub const ALL_LABEL: &'static str = "All";

    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    /// Parse a query-string value. Empty input and "All" (or the older
    /// "All Categories") select everything.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] for any other unrecognized value.
    pub fn parse(s: &str) -> Result<Self, UnknownCategory> {
        let s = s.trim();
        if s.is_empty()
            || s.eq_ignore_ascii_case(Self::ALL_LABEL)
            || s.eq_ignore_ascii_case("All Categories")
        {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Only(category) => category.name(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("home & garden".parse::<Category>().unwrap(), Category::HomeAndGarden);
        assert_eq!(" Books ".parse::<Category>().unwrap(), Category::Books);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "Spaceships".parse::<Category>(),
            Err(UnknownCategory("Spaceships".to_owned()))
        );
    }

    #[test]
    fn test_serializes_with_display_name() {
        let json = serde_json::to_string(&Category::HomeAndGarden).unwrap();
        assert_eq!(json, "\"Home & Garden\"");
        let parsed: Category = serde_json::from_str("\"Electronics\"").unwrap();
        assert_eq!(parsed, Category::Electronics);
    }

    #[test]
    fn test_every_name_round_trips() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_filter_parse_and_match() {
        assert_eq!(CategoryFilter::parse("").unwrap(), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("All Categories").unwrap(), CategoryFilter::All);
        let only = CategoryFilter::parse("Sports").unwrap();
        assert!(only.matches(Category::Sports));
        assert!(!only.matches(Category::Books));
        assert!(CategoryFilter::All.matches(Category::Books));
        assert!(CategoryFilter::parse("Nope").is_err());
    }
}
