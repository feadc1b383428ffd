//! Marketplace accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecofinds_core::{Email, UserId, Username};

/// A registered account.
///
/// There is no password hash: every account signs in with the shared demo
/// password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    /// Free-text location, e.g. `"San Francisco, CA"`.
    #[serde(default, alias = "location")]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(alias = "joinedDate")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in the header and on the dashboard.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            self.username.as_str()
        } else {
            &self.full_name
        }
    }

    /// Apply a validated profile update.
    pub fn apply(&mut self, update: ProfileUpdate) {
        self.username = update.username;
        self.full_name = update.full_name;
        self.phone = update.phone;
        self.address = update.address;
        self.avatar = update.avatar;
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Username,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub avatar: Option<String>,
}
