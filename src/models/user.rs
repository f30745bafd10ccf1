//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// User profile stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    /// Auth user ID (also the row ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Avatar to display: the stored one, or a generated one seeded by name.
    pub fn display_avatar(&self) -> String {
        self.avatar_url
            .clone()
            .unwrap_or_else(|| default_avatar_url(&self.name))
    }
}

/// Profile row inserted after a remote sign-up. `created_at` is set by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
}

impl NewProfile {
    pub fn new(id: String, email: String, name: String) -> Self {
        let avatar_url = default_avatar_url(&name);
        Self {
            id,
            email,
            name,
            avatar_url,
        }
    }
}

/// Generated avatar URL for a seed (usually the user's name).
pub fn default_avatar_url(seed: &str) -> String {
    format!("{}?seed={}", AVATAR_BASE_URL, urlencoding::encode(seed))
}
