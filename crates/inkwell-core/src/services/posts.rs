//! Post and comment mutations.

use crate::domain::{Comment, NewComment, NewPost, Post, PostContent, validate_comment_text};
use crate::error::DomainError;
use crate::outcome::{Outcome, Redirect};
use crate::ports::Repositories;

use super::{Actor, user_by_username};

#[derive(Clone)]
pub struct PostCommands {
    repos: Repositories,
}

impl PostCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Publish a post authored by `actor`.
    pub async fn create(&self, actor: &Actor, content: PostContent) -> Result<Post, DomainError> {
        self.validate(&content).await?;

        let post = self
            .repos
            .posts
            .create(NewPost {
                author_id: actor.user_id,
                content,
            })
            .await?;

        tracing::info!(post_id = post.id, author = %actor.username, "Post created");
        Ok(post)
    }

    /// Current values of a post for its edit form.
    pub async fn edit_form(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
    ) -> Result<Outcome<Post>, DomainError> {
        let post = self.load(username, post_id).await?;
        Ok(self.check_owner(actor, username, post))
    }

    pub async fn edit(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
        content: PostContent,
    ) -> Result<Outcome<Post>, DomainError> {
        let post = self.load(username, post_id).await?;
        let mut post = match self.check_owner(actor, username, post) {
            Outcome::Done(post) => post,
            Outcome::Redirect(target) => return Ok(Outcome::Redirect(target)),
        };

        self.validate(&content).await?;
        post.apply(content);
        let post = self.repos.posts.update(post).await?;

        tracing::info!(post_id, author = %actor.username, "Post updated");
        Ok(Outcome::Done(post))
    }

    pub async fn delete(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
    ) -> Result<Outcome<()>, DomainError> {
        let post = self.load(username, post_id).await?;
        let post = match self.check_owner(actor, username, post) {
            Outcome::Done(post) => post,
            Outcome::Redirect(target) => return Ok(Outcome::Redirect(target)),
        };

        self.repos.posts.delete(post.id).await?;
        tracing::info!(post_id, author = %actor.username, "Post deleted");
        Ok(Outcome::Done(()))
    }

    /// Comment on a post. The author is always the actor; the post comes
    /// from the URL.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
        text: String,
    ) -> Result<Comment, DomainError> {
        let post = self.load(username, post_id).await?;
        let comment = NewComment {
            post_id: post.id,
            author_id: actor.user_id,
            text,
        };
        comment.validate().into_result()?;

        let comment = self.repos.comments.create(comment).await?;
        tracing::info!(comment_id = comment.id, post_id, author = %actor.username, "Comment added");
        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
        comment_id: i64,
        text: String,
    ) -> Result<Outcome<Comment>, DomainError> {
        let mut comment = self.load_comment(username, post_id, comment_id).await?;
        if !actor.is(comment.author_id) {
            let target = Redirect::post(username, post_id);
            return Ok(self.refuse(actor, "comment", comment_id, target));
        }

        validate_comment_text(&text).into_result()?;
        comment.text = text;
        let comment = self.repos.comments.update(comment).await?;

        tracing::info!(comment_id, author = %actor.username, "Comment updated");
        Ok(Outcome::Done(comment))
    }

    pub async fn delete_comment(
        &self,
        actor: &Actor,
        username: &str,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Outcome<()>, DomainError> {
        let comment = self.load_comment(username, post_id, comment_id).await?;
        if !actor.is(comment.author_id) {
            let target = Redirect::post(username, post_id);
            return Ok(self.refuse(actor, "comment", comment_id, target));
        }

        self.repos.comments.delete(comment.id).await?;
        tracing::info!(comment_id, author = %actor.username, "Comment deleted");
        Ok(Outcome::Done(()))
    }

    /// The post `post_id`, provided `username` wrote it.
    async fn load(&self, username: &str, post_id: i64) -> Result<Post, DomainError> {
        let author = user_by_username(&self.repos, username).await?;
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .filter(|post| post.author_id == author.id)
            .ok_or_else(|| DomainError::not_found("post", format!("{username}/{post_id}")))
    }

    async fn load_comment(
        &self,
        username: &str,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let post = self.load(username, post_id).await?;
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|comment| comment.post_id == post.id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    fn check_owner(&self, actor: &Actor, username: &str, post: Post) -> Outcome<Post> {
        if actor.is(post.author_id) {
            Outcome::Done(post)
        } else {
            self.refuse(actor, "post", post.id, Redirect::post(username, post.id))
        }
    }

    fn refuse<T>(&self, actor: &Actor, kind: &str, id: i64, target: Redirect) -> Outcome<T> {
        tracing::warn!(user = %actor.username, kind, id, target = %target, "Refused mutation by non-owner");
        Outcome::Redirect(target)
    }

    async fn validate(&self, content: &PostContent) -> Result<(), DomainError> {
        let mut errors = content.validate();
        if let Some(group_id) = content.group_id {
            if self.repos.groups.find_by_id(group_id).await?.is_none() {
                errors.push(
                    "group",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
            }
        }
        errors.into_result()
    }
}
