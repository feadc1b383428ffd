//! Product route handlers.
//!
//! Anyone can view a listing. Creating requires a signed-in user; editing,
//! status changes and deletion are limited to the seller.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use ecofinds_core::{Category, ProductId, ProductStatus};

use super::{Flash, MessageQuery, NavView, OptionView, ProductCardView, format_date};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Product};
use crate::services::CatalogError;
use crate::services::catalog::{FieldErrors, ListingForm};
use crate::state::AppState;

/// Full listing data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub updated: String,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            updated: format_date(&product.updated_at),
        }
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub product: ProductDetailView,
    pub is_owner: bool,
    pub can_buy: bool,
}

/// Add/edit listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ListingFormTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ListingForm,
    pub errors: FieldErrors,
    pub categories: Vec<OptionView>,
}

impl ListingFormTemplate {
    fn new_listing(nav: NavView, form: ListingForm, errors: FieldErrors) -> Self {
        Self {
            nav,
            flash: Flash::default(),
            heading: "Add a new listing",
            action: "/products".to_string(),
            submit_label: "Publish listing",
            categories: listing_category_options(&form.category),
            form,
            errors,
        }
    }

    fn edit_listing(nav: NavView, id: ProductId, form: ListingForm, errors: FieldErrors) -> Self {
        Self {
            nav,
            flash: Flash::default(),
            heading: "Edit listing",
            action: format!("/products/{id}"),
            submit_label: "Save changes",
            categories: listing_category_options(&form.category),
            form,
            errors,
        }
    }
}

/// Category choices for the listing form, selecting whatever was posted.
fn listing_category_options(posted: &str) -> Vec<OptionView> {
    let posted = posted.parse::<Category>().ok();
    Category::ALL
        .into_iter()
        .map(|category| OptionView {
            value: category.name(),
            label: category.name(),
            selected: posted == Some(category),
        })
        .collect()
}

/// Load a listing and check that `user` sells it.
async fn owned_product(state: &AppState, id: ProductId, user: &CurrentUser) -> Result<Product> {
    let product = state.run(move |s| s.catalog().get(id)).await??;
    if !product.is_owned_by(user.id) {
        return Err(CatalogError::NotOwner.into());
    }
    Ok(product)
}

/// Display product detail page.
#[instrument(skip(state, user, query))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let product = state.run(move |s| s.catalog().get(id)).await??;
    let is_owner = user.as_ref().is_some_and(|u| product.is_owned_by(u.id));
    let can_buy = !is_owner && product.is_available();

    Ok(ProductShowTemplate {
        nav: NavView::load(&state, user).await?,
        flash: Flash::from_query(&query),
        product: ProductDetailView::from(&product),
        is_owner,
        can_buy,
    })
}

/// Display the add listing form.
#[instrument(skip(state, user))]
pub async fn new_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    Ok(ListingFormTemplate::new_listing(
        NavView::signed_in(&state, &user).await?,
        ListingForm::default(),
        FieldErrors::new(),
    ))
}

/// Handle add listing form submission.
///
/// Invalid input re-renders the form with per-field messages.
#[instrument(skip(state, user, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ListingForm>,
) -> Result<Response> {
    let listing = match form.validate() {
        Ok(listing) => listing,
        Err(errors) => {
            let nav = NavView::signed_in(&state, &user).await?;
            let page = ListingFormTemplate::new_listing(nav, form, errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let (user_id, seller_name) = (user.id, user.display_name.clone());
    let product = state
        .run(move |s| s.catalog().create(user_id, &seller_name, listing))
        .await??;
    Ok(Redirect::to(&format!("/products/{}?success=created", product.id)).into_response())
}

/// Display the edit listing form.
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = owned_product(&state, id, &user).await?;
    Ok(ListingFormTemplate::edit_listing(
        NavView::signed_in(&state, &user).await?,
        id,
        ListingForm::from_product(&product),
        FieldErrors::new(),
    ))
}

/// Handle edit listing form submission.
#[instrument(skip(state, user, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ListingForm>,
) -> Result<Response> {
    owned_product(&state, id, &user).await?;

    let listing = match form.validate() {
        Ok(listing) => listing,
        Err(errors) => {
            let page = ListingFormTemplate::edit_listing(
                NavView::signed_in(&state, &user).await?,
                id,
                form,
                errors,
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let user_id = user.id;
    state
        .run(move |s| s.catalog().update(id, user_id, listing))
        .await??;
    Ok(Redirect::to(&format!("/products/{id}?success=saved")).into_response())
}

/// Mark a listing sold, deactivate it, or put it back on sale.
#[instrument(skip(state, user))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status: ProductStatus = form.status.parse().map_err(AppError::BadRequest)?;

    let user_id = user.id;
    state
        .run(move |s| s.catalog().set_status(id, user_id, status))
        .await??;
    Ok(Redirect::to("/listings?success=status").into_response())
}

/// Delete a listing.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let user_id = user.id;
    state.run(move |s| s.catalog().delete(id, user_id)).await??;
    Ok(Redirect::to("/listings?success=deleted").into_response())
}
