//! Browse filters and sorting.

use std::cmp::Reverse;
use std::str::FromStr;

use ecofinds_core::CategoryFilter;

use crate::models::Product;

/// Browse page ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl SortOrder {
    pub const ALL: [Self; 3] = [Self::Newest, Self::PriceLow, Self::PriceHigh];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::PriceLow => "Price: low to high",
            Self::PriceHigh => "Price: high to low",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| format!("invalid sort order: {s}"))
    }
}

/// What the browse page asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the title or description.
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Build a query from raw query-string values.
    ///
    /// Unrecognized categories and sort orders fall back to the defaults
    /// rather than failing the page.
    #[must_use]
    pub fn from_params(search: Option<&str>, category: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            search: search.map(str::trim).unwrap_or_default().to_owned(),
            category: category
                .and_then(|c| CategoryFilter::parse(c).ok())
                .unwrap_or_default(),
            sort: sort.and_then(|s| s.parse().ok()).unwrap_or_default(),
        }
    }

    /// Whether `product` passes the search and category filters.
    ///
    /// Status is not checked here; see [`filter_and_sort`].
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.category.matches(product.category) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }
}

/// Active products matching `query`, in the requested order.
#[must_use]
pub fn filter_and_sort(products: Vec<Product>, query: &CatalogQuery) -> Vec<Product> {
    let mut matches: Vec<Product> = products
        .into_iter()
        .filter(|product| product.is_available() && query.matches(product))
        .collect();

    match query.sort {
        SortOrder::Newest => matches.sort_by_key(|p| Reverse((p.created_at, p.id))),
        SortOrder::PriceLow => matches.sort_by_key(|p| p.price),
        SortOrder::PriceHigh => matches.sort_by_key(|p| Reverse(p.price)),
    }
    matches
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use ecofinds_core::{Category, Price, ProductId, ProductStatus, UserId};

    use super::*;

    fn product(id: i64, title: &str, category: Category, cents: i64, age_days: i64) -> Product {
        let created = Utc::now() - Duration::days(age_days);
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            description: format!("{title} in good condition"),
            category,
            price: Price::from_cents(cents),
            image: "https://images.example.com/x.jpeg".to_string(),
            seller_id: UserId::new(2),
            seller_name: "sarah_wilson".to_string(),
            created_at: created,
            updated_at: created,
            status: ProductStatus::Active,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Leather Jacket", Category::Clothing, 8500, 3),
            product(2, "MacBook Air", Category::Electronics, 65_000, 1),
            product(3, "Coffee Table", Category::Furniture, 15_000, 2),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let result = filter_and_sort(catalog(), &CatalogQuery::default());
        assert_eq!(ids(&result), vec![2, 3, 1]);
    }

    #[test]
    fn test_price_sorting() {
        let low = CatalogQuery {
            sort: SortOrder::PriceLow,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_and_sort(catalog(), &low)), vec![1, 3, 2]);

        let high = CatalogQuery {
            sort: SortOrder::PriceHigh,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_and_sort(catalog(), &high)), vec![2, 3, 1]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_description() {
        let query = CatalogQuery::from_params(Some("  macbook "), None, None);
        assert_eq!(ids(&filter_and_sort(catalog(), &query)), vec![2]);

        let query = CatalogQuery::from_params(Some("GOOD CONDITION"), None, None);
        assert_eq!(filter_and_sort(catalog(), &query).len(), 3);
    }

    #[test]
    fn test_category_with_no_products_is_empty() {
        let query = CatalogQuery::from_params(None, Some("Books"), None);
        assert!(filter_and_sort(catalog(), &query).is_empty());

        let query = CatalogQuery::from_params(None, Some("Furniture"), None);
        assert_eq!(ids(&filter_and_sort(catalog(), &query)), vec![3]);
    }

    #[test]
    fn test_only_active_listings() {
        let mut products = catalog();
        if let Some(first) = products.first_mut() {
            first.status = ProductStatus::Sold;
        }
        if let Some(last) = products.last_mut() {
            last.status = ProductStatus::Inactive;
        }
        assert_eq!(ids(&filter_and_sort(products, &CatalogQuery::default())), vec![2]);
    }

    #[test]
    fn test_from_params_is_lenient() {
        let query = CatalogQuery::from_params(None, Some("Spaceships"), Some("cheapest"));
        assert_eq!(query, CatalogQuery::default());

        let query = CatalogQuery::from_params(Some("bike"), Some("All"), Some("price-high"));
        assert_eq!(query.search, "bike");
        assert_eq!(query.category, CategoryFilter::All);
        assert_eq!(query.sort, SortOrder::PriceHigh);
    }
}
