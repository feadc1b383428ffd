//! Authentication route handlers.
//!
//! Handles login, registration and logout against the demo account store.
//! Failures redirect back to the form with an error code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Flash, MessageQuery, NavView, safe_next};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Login page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub flash: Flash,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavView,
    pub flash: Flash,
}

// =============================================================================
// Helpers
// =============================================================================

/// Put `user` in the session and tag Sentry events with them.
async fn sign_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

fn login_error_url(code: &str, next: &str) -> String {
    if next == "/" {
        format!("/auth/login?error={code}")
    } else {
        format!(
            "/auth/login?error={code}&next={}",
            urlencoding::encode(next)
        )
    }
}

const fn register_error_code(error: &AuthError) -> Option<&'static str> {
    match error {
        AuthError::InvalidEmail(_) => Some("invalid_email"),
        AuthError::InvalidUsername(_) => Some("invalid_username"),
        AuthError::EmptyPassword => Some("password_required"),
        AuthError::EmailTaken => Some("email_taken"),
        AuthError::UsernameTaken => Some("username_taken"),
        _ => None,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in visitors go straight to `next`.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if user.is_some() {
        return Redirect::to(&next).into_response();
    }

    LoginTemplate {
        nav: NavView::default(),
        flash: Flash::from_query(&MessageQuery {
            error: query.error,
            success: query.success,
        }),
        next,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let LoginForm {
        email,
        password,
        next,
    } = form;
    let next = safe_next(next.as_deref());

    state.auth().login_delay().await;
    match state
        .run(move |s| s.auth().login(&email, &password))
        .await?
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            Ok(Redirect::to(next).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed");
            Ok(Redirect::to(&login_error_url("credentials", next)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        nav: NavView::default(),
        flash: Flash::from_query(&query),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A new account is signed in straight away.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form
        .password_confirm
        .as_deref()
        .is_some_and(|confirm| confirm != form.password)
    {
        return Ok(Redirect::to("/auth/register?error=password_mismatch").into_response());
    }

    let RegisterForm {
        email,
        username,
        password,
        ..
    } = form;

    state.auth().login_delay().await;
    match state
        .run(move |s| s.auth().signup(&email, &password, &username))
        .await?
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            Ok(Redirect::to("/?success=registered").into_response())
        }
        Err(e) => match register_error_code(&e) {
            Some(code) => {
                tracing::warn!(error = %e, "Registration rejected");
                Ok(Redirect::to(&format!("/auth/register?error={code}")).into_response())
            }
            None => Err(e.into()),
        },
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/?success=logged_out").into_response())
}

#[cfg(test)]
mod tests {
    use ecofinds_core::UsernameError;

    use super::*;

    #[test]
    fn test_login_error_url_keeps_next() {
        assert_eq!(
            login_error_url("credentials", "/"),
            "/auth/login?error=credentials"
        );
        assert_eq!(
            login_error_url("credentials", "/cart"),
            "/auth/login?error=credentials&next=%2Fcart"
        );
    }

    #[test]
    fn test_register_error_codes() {
        assert_eq!(
            register_error_code(&AuthError::EmailTaken),
            Some("email_taken")
        );
        assert_eq!(
            register_error_code(&AuthError::InvalidUsername(UsernameError::Empty)),
            Some("invalid_username")
        );
        assert_eq!(register_error_code(&AuthError::InvalidCredentials), None);
    }
}
