//! Browse page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use ecofinds_core::{Category, CategoryFilter};

use super::{Flash, MessageQuery, NavView, OptionView, ProductCardView};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::{CatalogQuery, SortOrder};
use crate::state::AppState;

/// Browse query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Browse page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct BrowseTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub search: String,
    pub categories: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub products: Vec<ProductCardView>,
    pub filtered: bool,
}

/// Display the catalog, filtered and sorted by the query string.
#[instrument(skip(state, user))]
pub async fn browse(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<BrowseQuery>,
) -> Result<impl IntoResponse> {
    let catalog_query = CatalogQuery::from_params(
        query.q.as_deref(),
        query.category.as_deref(),
        query.sort.as_deref(),
    );
    let task_query = catalog_query.clone();
    let products = state
        .run(move |s| s.catalog().browse(&task_query))
        .await??;

    let flash = Flash::from_query(&MessageQuery {
        error: query.error,
        success: query.success,
    });

    Ok(BrowseTemplate {
        nav: NavView::load(&state, user).await?,
        flash,
        filtered: !catalog_query.search.is_empty() || catalog_query.category != CategoryFilter::All,
        categories: category_options(catalog_query.category),
        sorts: sort_options(catalog_query.sort),
        search: catalog_query.search,
        products: products.iter().map(ProductCardView::from).collect(),
    })
}

/// "All" followed by every category.
#[must_use]
pub fn category_options(selected: CategoryFilter) -> Vec<OptionView> {
    std::iter::once(CategoryFilter::All)
        .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
        .map(|filter| OptionView {
            value: filter.label(),
            label: filter.label(),
            selected: filter == selected,
        })
        .collect()
}

fn sort_options(selected: SortOrder) -> Vec<OptionView> {
    SortOrder::ALL
        .into_iter()
        .map(|order| OptionView {
            value: order.as_str(),
            label: order.label(),
            selected: order == selected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_options_mark_selection() {
        let options = category_options(CategoryFilter::Only(Category::Books));
        assert_eq!(options.len(), Category::ALL.len() + 1);
        assert_eq!(options.first().map(|o| o.value), Some("All"));
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|o| o.value), Some("Books"));
    }

    #[test]
    fn test_sort_options_default_to_newest() {
        let options = sort_options(SortOrder::default());
        assert!(options.first().is_some_and(|o| o.selected && o.value == "newest"));
    }
}
