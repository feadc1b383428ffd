//! Authentication service.
//!
//! Demo-grade sign-in: an account is identified by email and every account
//! shares one configured password. Nothing here is suitable for real
//! credentials.

mod error;
mod form;

pub use error::AuthError;
pub use form::ProfileForm;

use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::instrument;

use ecofinds_core::{Email, UserId, Username};

use crate::config::AuthConfig;
use crate::models::{ProfileUpdate, User};
use crate::storage::Storage;

/// Authentication service.
///
/// Handles login, signup and profile updates against the users blob.
pub struct AuthService<'a> {
    storage: &'a Storage,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(storage: &'a Storage, config: &'a AuthConfig) -> Self {
        Self { storage, config }
    }

    /// Sign in with email and the demo password.
    ///
    /// Request handlers wait out [`AuthService::login_delay`] before calling
    /// this, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no account has this email
    /// or the password is wrong. Returns `AuthError::Storage` if the users
    /// blob cannot be read.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .list()?
            .into_iter()
            .find(|user| user.email == email)
            .ok_or(AuthError::InvalidCredentials)?;

        if password != self.config.demo_password.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Register a new account.
    ///
    /// The new user's full name starts out as the username; the other
    /// profile fields start empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::InvalidUsername` or
    /// `AuthError::EmptyPassword` for bad input, and `AuthError::EmailTaken`
    /// or `AuthError::UsernameTaken` if another account already uses them.
    #[instrument(skip(self, password))]
    pub fn signup(&self, email: &str, password: &str, username: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let username = Username::parse(username)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let id: UserId = self.storage.next_id();
        let key = self.storage.keys().users();
        let user = self.storage.update(&key, |users: &mut Vec<User>| {
            if users.iter().any(|user| user.email == email) {
                return Err(AuthError::EmailTaken);
            }
            if users.iter().any(|user| user.username.same_as(&username)) {
                return Err(AuthError::UsernameTaken);
            }

            let user = User {
                id,
                email,
                full_name: username.to_string(),
                username,
                phone: String::new(),
                address: String::new(),
                avatar: None,
                created_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the users blob cannot be read.
    pub fn find(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.list()?.into_iter().find(|user| user.id == id))
    }

    /// All registered users, in signup order.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the users blob cannot be read.
    pub fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.storage.load_or_default(&self.storage.keys().users())?)
    }

    /// Replace a user's editable profile fields.
    ///
    /// Existing listings keep the seller name they were created with.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UsernameTaken` if another account has the new
    /// username, or `AuthError::UserNotFound` if the account is gone.
    #[instrument(skip(self, update))]
    pub fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, AuthError> {
        let key = self.storage.keys().users();
        self.storage.update(&key, |users: &mut Vec<User>| {
            if users
                .iter()
                .any(|user| user.id != id && user.username.same_as(&update.username))
            {
                return Err(AuthError::UsernameTaken);
            }
            let user = users
                .iter_mut()
                .find(|user| user.id == id)
                .ok_or(AuthError::UserNotFound)?;
            user.apply(update);
            Ok(user.clone())
        })
    }

    /// Sleep for the configured sign-in delay. Runs on the async side so
    /// the wait never holds a blocking thread.
    pub async fn login_delay(&self) {
        if !self.config.login_delay.is_zero() {
            tokio::time::sleep(self.config.login_delay).await;
        }
    }
}
