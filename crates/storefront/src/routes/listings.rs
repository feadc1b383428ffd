//! "My listings" route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::{Flash, MessageQuery, NavView, ProductCardView};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Seller listings page template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/index.html")]
pub struct ListingsTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub listings: Vec<ProductCardView>,
}

/// Every listing the signed-in user has posted, in any status.
#[instrument(skip(state, user, query))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let user_id = user.id;
    let listings = state
        .run(move |s| s.catalog().listings_by_seller(user_id))
        .await??;

    Ok(ListingsTemplate {
        nav: NavView::signed_in(&state, &user).await?,
        flash: Flash::from_query(&query),
        listings: listings.iter().map(ProductCardView::from).collect(),
    })
}
