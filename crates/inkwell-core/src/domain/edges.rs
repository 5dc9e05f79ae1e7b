use serde::{Deserialize, Serialize};

/// Follow edge: `user_id` receives posts of `author_id` in their feed.
///
/// At most one edge exists per `(user_id, author_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}

/// Like edge between a user and a post, unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}
