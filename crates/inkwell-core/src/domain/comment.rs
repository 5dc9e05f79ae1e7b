use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

/// Comment entity - belongs to one post and one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Insert request for a comment. Both ends come from the request context.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

impl NewComment {
    pub fn validate(&self) -> FieldErrors {
        validate_comment_text(&self.text)
    }
}

pub fn validate_comment_text(text: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.required("text", text);
    errors
}

/// A comment with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: String,
}
