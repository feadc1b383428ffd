//! Cart route handlers.
//!
//! Cart operations are plain form posts that redirect back with a status
//! code in the query string.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use ecofinds_core::ProductId;

use super::{Flash, MessageQuery, NavView};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Cart, CartItem};
use crate::services::CartError;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub image: String,
    pub seller_name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            title: item.product.title.clone(),
            image: item.product.image.clone(),
            seller_name: item.product.seller_name.clone(),
            quantity: item.quantity,
            price: item.product.price.to_string(),
            line_price: item.line_total().to_string(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, user, query))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let user_id = user.id;
    let cart = state.run(move |s| s.cart().items(user_id)).await??;

    Ok(CartShowTemplate {
        nav: NavView::signed_in(&state, &user).await?,
        flash: Flash::from_query(&query),
        cart: CartView::from(&cart),
    })
}

/// Add one unit of a listing to the cart.
///
/// Refusals (own listing, sold or missing item) redirect back with an
/// error code instead of failing the request.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let (user_id, product_id) = (user.id, form.product_id);
    let target = match state.run(move |s| s.cart().add(user_id, product_id)).await? {
        Ok(_) => "/cart?success=added".to_string(),
        Err(CartError::OwnListing) => format!("/products/{product_id}?error=own_listing"),
        Err(CartError::Unavailable) => format!("/products/{product_id}?error=unavailable"),
        Err(CartError::ProductNotFound(_)) => "/?error=not_found".to_string(),
        Err(e) => return Err(e.into()),
    };
    Ok(Redirect::to(&target).into_response())
}

/// Set the quantity of a cart line. Zero removes it.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let (user_id, product_id, quantity) = (user.id, form.product_id, form.quantity);
    state
        .run(move |s| s.cart().set_quantity(user_id, product_id, quantity))
        .await??;

    let target = if form.quantity == 0 {
        "/cart?success=removed"
    } else {
        "/cart?success=updated"
    };
    Ok(Redirect::to(target).into_response())
}

/// Remove a cart line. Removing something that is not in the cart is fine.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let (user_id, product_id) = (user.id, form.product_id);
    state
        .run(move |s| s.cart().remove(user_id, product_id))
        .await??;
    Ok(Redirect::to("/cart?success=removed").into_response())
}

/// Cart count badge fragment. Anonymous visitors get zero.
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let count = match user {
        Some(user) => state.run(move |s| s.cart().item_count(user.id)).await??,
        None => 0,
    };
    Ok(CartCountTemplate { count })
}
