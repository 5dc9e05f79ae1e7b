//! Application services: typed queries and ownership-checked commands over
//! the repository ports.

mod accounts;
mod feed;
mod feed_cache;
mod groups;
mod posts;
mod social;

pub use accounts::AccountCommands;
pub use feed::{AuthorFeed, FeedQueries, GroupFeed, PostDetail};
pub use feed_cache::{DEFAULT_FEED_TTL, FeedCache};
pub use groups::GroupCommands;
pub use posts::PostCommands;
pub use social::SocialGraph;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::Repositories;

/// The authenticated user performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
}

impl Actor {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    pub fn is(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.username.clone())
    }
}

pub(crate) async fn user_by_username(
    repos: &Repositories,
    username: &str,
) -> Result<User, DomainError> {
    repos
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))
}
