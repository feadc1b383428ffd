//! Dashboard route handlers: profile editing and account statistics.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use ecofinds_core::ProductStatus;

use super::{Flash, MessageQuery, NavView, format_date};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user, refresh_current_user};
use crate::models::{CurrentUser, User};
use crate::services::catalog::FieldErrors;
use crate::services::{AuthError, ProfileForm};
use crate::state::AppState;

/// Read-only account details.
#[derive(Clone)]
pub struct ProfileView {
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub member_since: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            display_name: user.display_name().to_owned(),
            avatar: user.avatar.clone(),
            member_since: format_date(&user.created_at),
        }
    }
}

/// Selling and buying totals.
#[derive(Clone, Default)]
pub struct StatsView {
    pub listing_count: usize,
    pub active_listings: usize,
    pub sold_listings: usize,
    pub purchase_count: usize,
    pub items_bought: u32,
    pub total_spent: String,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/show.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub profile: ProfileView,
    pub form: ProfileForm,
    pub errors: FieldErrors,
    pub stats: StatsView,
}

async fn stats(state: &AppState, user: &CurrentUser) -> Result<StatsView> {
    let user_id = user.id;
    state
        .run(move |s| -> Result<StatsView> {
            let listings = s.catalog().listings_by_seller(user_id)?;
            let summary = s.checkout().summary(user_id)?;
            Ok(StatsView {
                listing_count: listings.len(),
                active_listings: listings.iter().filter(|p| p.status.is_active()).count(),
                sold_listings: listings
                    .iter()
                    .filter(|p| p.status == ProductStatus::Sold)
                    .count(),
                purchase_count: summary.purchase_count,
                items_bought: summary.items_bought,
                total_spent: summary.total_spent.to_string(),
            })
        })
        .await?
}

async fn render(
    state: &AppState,
    user: &CurrentUser,
    record: &User,
    flash: Flash,
    form: ProfileForm,
    errors: FieldErrors,
) -> Result<DashboardTemplate> {
    Ok(DashboardTemplate {
        nav: NavView::signed_in(state, user).await?,
        flash,
        profile: ProfileView::from(record),
        form,
        errors,
        stats: stats(state, user).await?,
    })
}

/// The session points at an account that no longer exists.
async fn sign_out_missing(session: &Session) -> Result<Response> {
    clear_current_user(session).await?;
    Ok(Redirect::to("/auth/login").into_response())
}

/// Display the dashboard.
#[instrument(skip(state, user, session, query))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let user_id = user.id;
    let Some(record) = state.run(move |s| s.auth().find(user_id)).await?? else {
        return sign_out_missing(&session).await;
    };

    let page = render(
        &state,
        &user,
        &record,
        Flash::from_query(&query),
        ProfileForm::from_user(&record),
        FieldErrors::new(),
    )
    .await?;
    Ok(page.into_response())
}

/// Handle profile form submission.
///
/// Invalid input or a taken username re-renders the form with messages.
#[instrument(skip(state, user, session, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let user_id = user.id;
    let Some(record) = state.run(move |s| s.auth().find(user_id)).await?? else {
        return sign_out_missing(&session).await;
    };

    let errors = match form.validate() {
        Ok(update) => match state
            .run(move |s| s.auth().update_profile(user_id, update))
            .await?
        {
            Ok(updated) => {
                refresh_current_user(&session, &CurrentUser::from(&updated)).await?;
                return Ok(Redirect::to("/dashboard?success=profile").into_response());
            }
            Err(AuthError::UsernameTaken) => {
                let mut errors = FieldErrors::new();
                errors.insert("username", "That username is already taken");
                errors
            }
            Err(AuthError::UserNotFound) => return sign_out_missing(&session).await,
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let page = render(&state, &user, &record, Flash::default(), form, errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}
