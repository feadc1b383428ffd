//! Purchase history route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::cart::CartItemView;
use super::{Flash, MessageQuery, NavView, format_date};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Purchase;
use crate::state::AppState;

/// Purchase display data for templates.
#[derive(Clone)]
pub struct PurchaseView {
    pub id: String,
    pub date: String,
    pub status: String,
    pub total: String,
    pub item_count: u32,
    pub items: Vec<CartItemView>,
}

impl From<&Purchase> for PurchaseView {
    fn from(purchase: &Purchase) -> Self {
        Self {
            id: purchase.id.to_string(),
            date: format_date(&purchase.purchase_date),
            status: purchase.status.to_string(),
            total: purchase.total_amount.to_string(),
            item_count: purchase.item_count(),
            items: purchase.items.iter().map(CartItemView::from).collect(),
        }
    }
}

/// Purchase history page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchases/index.html")]
pub struct PurchasesTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub purchases: Vec<PurchaseView>,
}

/// The signed-in user's purchases, newest first.
#[instrument(skip(state, user, query))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let user_id = user.id;
    let purchases = state
        .run(move |s| s.checkout().purchases(user_id))
        .await??;

    Ok(PurchasesTemplate {
        nav: NavView::signed_in(&state, &user).await?,
        flash: Flash::from_query(&query),
        purchases: purchases.iter().map(PurchaseView::from).collect(),
    })
}
