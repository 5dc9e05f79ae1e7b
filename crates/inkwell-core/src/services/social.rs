//! Relationship resolver: follow edges and likes.

use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::ports::Repositories;

use super::Actor;

/// Queries and mutations over the social graph.
#[derive(Clone)]
pub struct SocialGraph {
    repos: Repositories,
}

impl SocialGraph {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Whether `viewer` follows `author_id`. Anonymous viewers follow nobody.
    pub async fn is_following(
        &self,
        viewer: Option<&Actor>,
        author_id: i64,
    ) -> Result<bool, DomainError> {
        match viewer {
            Some(actor) => Ok(self.repos.follows.exists(actor.user_id, author_id).await?),
            None => Ok(false),
        }
    }

    pub async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, DomainError> {
        Ok(self.repos.follows.followers_of(user_id).await?)
    }

    pub async fn following_of(&self, user_id: i64) -> Result<Vec<User>, DomainError> {
        Ok(self.repos.follows.following_of(user_id).await?)
    }

    /// Follow `author`. Following yourself is ignored and repeating a follow
    /// keeps the single existing edge. Returns whether an edge was created.
    pub async fn follow(&self, actor: &Actor, author: &User) -> Result<bool, DomainError> {
        if actor.is(author.id) {
            tracing::debug!(user = %actor.username, "Ignoring self-follow");
            return Ok(false);
        }

        let (_, created) = self
            .repos
            .follows
            .get_or_create(actor.user_id, author.id)
            .await?;

        if created {
            tracing::info!(follower = %actor.username, author = %author.username, "Follow created");
        }
        Ok(created)
    }

    /// Remove the follow edge; a missing edge is reported as not found.
    pub async fn unfollow(&self, actor: &Actor, author: &User) -> Result<(), DomainError> {
        match self.repos.follows.remove(actor.user_id, author.id).await {
            Ok(()) => {
                tracing::info!(follower = %actor.username, author = %author.username, "Follow removed");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found(
                "follow",
                format!("{} -> {}", actor.username, author.username),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip the actor's like on a post. Returns whether the post is liked now.
    pub async fn toggle_like(&self, actor: &Actor, post_id: i64) -> Result<bool, DomainError> {
        let liked = self.repos.likes.toggle(actor.user_id, post_id).await?;
        tracing::debug!(user = %actor.username, post_id, liked, "Like toggled");
        Ok(liked)
    }

    pub async fn likers_of(&self, post_id: i64) -> Result<Vec<User>, DomainError> {
        Ok(self.repos.likes.likers_of(post_id).await?)
    }
}
