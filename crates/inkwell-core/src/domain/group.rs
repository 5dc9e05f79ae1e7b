use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

/// Maximum length of a group title and slug, in characters.
pub const GROUP_FIELD_MAX_CHARS: usize = 200;

/// Group entity - a named collection of posts.
///
/// `creator_id` becomes `None` when the creating user is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub creator_id: Option<i64>,
}

impl Group {
    pub fn apply(&mut self, content: GroupContent) {
        self.title = content.title;
        self.slug = content.slug;
        self.description = content.description;
    }
}

/// Editable part of a group, as submitted through the group form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupContent {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl GroupContent {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.required("title", &self.title);
        errors.max_chars("title", &self.title, GROUP_FIELD_MAX_CHARS);
        errors.slug("slug", &self.slug);
        errors.max_chars("slug", &self.slug, GROUP_FIELD_MAX_CHARS);
        errors
    }
}

/// Insert request for a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub creator_id: i64,
    pub content: GroupContent,
}
