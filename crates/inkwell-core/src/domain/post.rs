use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

/// Maximum length of a post title, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Post entity - a blog post written by exactly one author.
///
/// `created_at` is assigned by the store on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Overwrite the editable fields, keeping identity, author and timestamp.
    pub fn apply(&mut self, content: PostContent) {
        self.title = content.title;
        self.text = content.text;
        self.group_id = content.group_id;
        self.image = content.image;
    }
}

/// Editable part of a post, as submitted through the post form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl PostContent {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.required("title", &self.title);
        errors.max_chars("title", &self.title, TITLE_MAX_CHARS);
        errors.required("text", &self.text);
        errors
    }
}

/// Insert request for a post. The author always comes from the acting identity.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub content: PostContent,
}

/// Title and slug of the group a post is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLink {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// A post joined with the data every listing shows next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: String,
    pub group: Option<GroupLink>,
}

impl PostEntry {
    pub fn id(&self) -> i64 {
        self.post.id
    }
}
