//! Listing form input and validation.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use ecofinds_core::{Category, Price, PriceError};

use crate::models::{Listing, Product};

/// Minimum title length, in characters.
pub const TITLE_MIN_LENGTH: usize = 3;

/// Minimum description length, in characters.
pub const DESCRIPTION_MIN_LENGTH: usize = 10;

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message for `field`, if it failed validation.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Raw add/edit listing form, as posted.
///
/// Values are kept as strings so an invalid form can be re-rendered with
/// exactly what the seller typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
}

impl ListingForm {
    /// Prefill the edit form from an existing listing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.name().to_owned(),
            price: product.price.to_input_value(),
            image: product.image.clone(),
        }
    }

    /// Validate every field, collecting one message per failing field.
    ///
    /// # Errors
    ///
    /// Returns the [`FieldErrors`] when any field is invalid.
    pub fn validate(&self) -> Result<Listing, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required");
        } else if title.chars().count() < TITLE_MIN_LENGTH {
            errors.insert(
                "title",
                format!("Title must be at least {TITLE_MIN_LENGTH} characters"),
            );
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert("description", "Description is required");
        } else if description.chars().count() < DESCRIPTION_MIN_LENGTH {
            errors.insert(
                "description",
                format!("Description must be at least {DESCRIPTION_MIN_LENGTH} characters"),
            );
        }

        let category = if self.category.trim().is_empty() {
            errors.insert("category", "Category is required");
            None
        } else {
            match self.category.parse::<Category>() {
                Ok(category) => Some(category),
                Err(_) => {
                    errors.insert("category", "Please choose a category from the list");
                    None
                }
            }
        };

        let price = match Price::parse_listing(&self.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.insert("price", price_message(&e));
                None
            }
        };

        let image = self.image.trim();
        if image.is_empty() {
            errors.insert("image", "Image URL is required");
        } else if !is_web_url(image) {
            errors.insert("image", "Image URL must start with http:// or https://");
        }

        match (category, price) {
            (Some(category), Some(price)) if errors.is_empty() => Ok(Listing {
                title: title.to_owned(),
                description: description.to_owned(),
                category,
                price,
                image: image.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

const fn price_message(error: &PriceError) -> &'static str {
    match error {
        PriceError::Empty => "Price is required",
        PriceError::NotANumber => "Price must be a number",
        PriceError::NotPositive => "Price must be greater than 0",
        PriceError::TooLarge => "Price must be at most $1,000,000",
    }
}

pub(crate) fn is_web_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ListingForm {
        ListingForm {
            title: "Trek Mountain Bike".to_string(),
            description: "Well-maintained Trek mountain bike.".to_string(),
            category: "Sports".to_string(),
            price: "320".to_string(),
            image: "https://images.example.com/bike.jpeg".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let listing = valid_form().validate().unwrap();
        assert_eq!(listing.category, Category::Sports);
        assert_eq!(listing.price, Price::from_cents(32_000));
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = ListingForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert_eq!(errors.get("category"), Some("Category is required"));
        assert_eq!(errors.get("price"), Some("Price is required"));
        assert_eq!(errors.get("image"), Some("Image URL is required"));
    }

    #[test]
    fn test_length_minimums() {
        let form = ListingForm {
            title: "TV".to_string(),
            description: "Too short".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title must be at least 3 characters"));
        assert_eq!(
            errors.get("description"),
            Some("Description must be at least 10 characters")
        );
        assert_eq!(errors.get("price"), None);
    }

    #[test]
    fn test_price_and_url_rules() {
        let form = ListingForm {
            price: "0".to_string(),
            image: "ftp://files.example.com/bike.jpeg".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
        assert!(errors.get("image").is_some());

        let form = ListingForm {
            price: "abc".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("price"),
            Some("Price must be a number")
        );
    }

    #[test]
    fn test_price_ceiling() {
        let form = ListingForm {
            price: "1000000".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().price, Price::MAX_LISTING);

        let form = ListingForm {
            price: "79228162514264337593543950335".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("price"),
            Some("Price must be at most $1,000,000")
        );
    }

    #[test]
    fn test_unknown_category() {
        let form = ListingForm {
            category: "Spaceships".to_string(),
            ..valid_form()
        };
        assert!(form.validate().unwrap_err().get("category").is_some());
    }
}
