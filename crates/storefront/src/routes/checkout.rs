//! Checkout route handler.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::CheckoutError;
use crate::state::AppState;

/// Purchase everything in the cart.
///
/// An empty cart sends the user back to the cart page; nothing is recorded.
#[instrument(skip(state, user))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let user_id = user.id;
    match state.run(move |s| s.checkout().checkout(user_id)).await? {
        Ok(_) => Ok(Redirect::to("/purchases?success=purchased").into_response()),
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart?error=empty_cart").into_response()),
        Err(e) => Err(e.into()),
    }
}
