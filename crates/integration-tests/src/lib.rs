//! Integration tests for EcoFinds.
//!
//! Tests drive the full storefront router in-process: each [`TestApp`] gets
//! its own in-memory store seeded with the demo data, and a [`Browser`]
//! carries the session cookie between requests the way a real browser
//! would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ecofinds-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `marketplace_flow` - Browse, cart and checkout over HTTP
//! - `listings` - Seller listing management over HTTP
//! - `accounts` - Registration, login and profile over HTTP
//! - `services` - Service-level rules against file and memory storage

#![allow(clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use ecofinds_storefront::config::StorefrontConfig;
use ecofinds_storefront::middleware::SESSION_COOKIE_NAME;
use ecofinds_storefront::seed::{self, SeedData};
use ecofinds_storefront::state::AppState;

/// Password every demo account signs in with.
pub const DEMO_PASSWORD: &str = "password";

/// Configuration for tests: memory storage, no login delay, no rate limit.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| {
        let value = match key {
            "ECOFINDS_BASE_URL" => "http://localhost:3000",
            "ECOFINDS_STORAGE" => "memory",
            "ECOFINDS_LOGIN_DELAY_MS" => "0",
            "ECOFINDS_AUTH_RATE_LIMIT" | "ECOFINDS_SEED_DEMO_DATA" => "false",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test configuration is valid")
}

/// The storefront app over a fresh in-memory store.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// App seeded with the bundled demo users and listings.
    #[must_use]
    pub fn seeded() -> Self {
        let app = Self::empty();
        let data = SeedData::demo().expect("demo seed parses");
        seed::seed(app.state.storage(), data, false).expect("demo seed applies");
        app
    }

    /// App with no users or listings.
    #[must_use]
    pub fn empty() -> Self {
        let state = AppState::from_config(test_config()).expect("memory storage opens");
        let router = ecofinds_storefront::app(state.clone());
        Self { state, router }
    }

    /// A visitor with no session yet.
    #[must_use]
    pub const fn browser(&self) -> Browser<'_> {
        Browser {
            app: self,
            cookie: None,
        }
    }

    /// A visitor already signed in as `email`.
    pub async fn signed_in(&self, email: &str) -> Browser<'_> {
        let mut browser = self.browser();
        let response = browser.login(email, DEMO_PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert!(browser.cookie.is_some(), "login sets a session cookie");
        browser
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter(|value| value.starts_with(SESSION_COOKIE_NAME))
            .find_map(|value| value.split(';').next())
            .map(str::to_owned);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        TestResponse {
            status,
            location,
            session_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// What the router sent back.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    /// `name=value` of the session cookie, when the response set one.
    pub session_cookie: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Assert a 303 redirect to exactly `path`.
    pub fn assert_redirect(&self, path: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(path));
    }
}

/// One visitor's cookie jar over a [`TestApp`].
pub struct Browser<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
}

impl Browser<'_> {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self
            .request("GET", path)
            .body(Body::empty())
            .expect("request builds");
        self.send(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .expect("request builds");
        self.send(request).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post("/auth/login", &[("email", email), ("password", password)])
            .await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.send(request).await;
        if let Some(cookie) = &response.session_cookie {
            self.cookie = Some(cookie.clone());
        }
        response
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
