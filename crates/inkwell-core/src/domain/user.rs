use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

/// Maximum length of a profile bio, in characters.
pub const BIO_MAX_CHARS: usize = 500;

/// User entity - an author account. Rows are written by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

/// Profile - one-to-one extension of a user, created on first settings access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub bio: String,
    pub image: Option<String>,
}

impl Profile {
    /// Empty profile for a user that never opened their settings.
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            bio: String::new(),
            image: None,
        }
    }
}

/// Submitted profile settings.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: String,
    pub image: Option<String>,
}

impl ProfileChanges {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.max_chars("bio", &self.bio, BIO_MAX_CHARS);
        errors
    }
}
