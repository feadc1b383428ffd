//! Profile form input and validation.

use serde::Deserialize;

use ecofinds_core::{Username, UsernameError};

use crate::models::{ProfileUpdate, User};
use crate::services::catalog::{FieldErrors, is_web_url};

/// Raw dashboard profile form, as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub avatar: String,
}

impl ProfileForm {
    /// Prefill the form from the stored account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.to_string(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            avatar: user.avatar.clone().unwrap_or_default(),
        }
    }

    /// Validate the form. Everything but the username may be blank.
    ///
    /// # Errors
    ///
    /// Returns the [`FieldErrors`] when the username or avatar URL is invalid.
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = match Username::parse(&self.username) {
            Ok(username) => Some(username),
            Err(e) => {
                errors.insert("username", username_message(&e));
                None
            }
        };

        let avatar = self.avatar.trim();
        if !avatar.is_empty() && !is_web_url(avatar) {
            errors.insert("avatar", "Avatar URL must start with http:// or https://");
        }

        match username {
            Some(username) if errors.is_empty() => Ok(ProfileUpdate {
                username,
                full_name: self.full_name.trim().to_owned(),
                phone: self.phone.trim().to_owned(),
                address: self.address.trim().to_owned(),
                avatar: (!avatar.is_empty()).then(|| avatar.to_owned()),
            }),
            _ => Err(errors),
        }
    }
}

fn username_message(error: &UsernameError) -> String {
    match error {
        UsernameError::Empty => "Username is required".to_string(),
        UsernameError::Length { min, max } => {
            format!("Username must be between {min} and {max} characters")
        }
        UsernameError::InvalidCharacters => {
            "Username may only contain letters, numbers and underscores".to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProfileForm {
        ProfileForm {
            username: " john_eco ".to_string(),
            full_name: "John Smith".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            address: "San Francisco, CA".to_string(),
            avatar: String::new(),
        }
    }

    #[test]
    fn test_valid_profile() {
        let update = form().validate().unwrap();
        assert_eq!(update.username.as_str(), "john_eco");
        assert_eq!(update.full_name, "John Smith");
        assert!(update.avatar.is_none());
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let errors = ProfileForm {
            username: "no spaces allowed".to_string(),
            avatar: "ftp://example.com/me.png".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("username").is_some());
        assert!(errors.get("avatar").is_some());
    }

    #[test]
    fn test_avatar_url_is_kept() {
        let update = ProfileForm {
            avatar: "https://images.example.com/me.jpeg".to_string(),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(
            update.avatar.as_deref(),
            Some("https://images.example.com/me.jpeg")
        );
    }
}
