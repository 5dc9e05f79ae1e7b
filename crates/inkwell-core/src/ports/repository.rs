use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Comment, CommentEntry, Follow, Group, NewComment, NewGroup, NewPost, Post, PostEntry, Profile,
    User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist every field of an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Owned rows follow the store's cascade rules.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Which posts a listing selects. Every variant is ordered newest first,
/// ties broken by ascending id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Author(i64),
    Group(i64),
    /// Posts whose author is followed by the given user.
    FollowedBy(i64),
    /// Case-insensitive substring match on title, text, author username or
    /// group title. Wildcard characters are matched literally.
    Search(String),
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Insert a user row. Fails with `Constraint` on a taken username.
    async fn create(&self, username: &str) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Users ordered by `date_joined` descending.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, RepoError>;
}

/// Profile repository, keyed by user id.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, i64> {
    async fn get_or_create(&self, user_id: i64) -> Result<Profile, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    /// Fails with `Constraint` when the title or slug is taken.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Group>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Groups ordered by title.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Group>, RepoError>;

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn find_entry(&self, id: i64) -> Result<Option<PostEntry>, RepoError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of a post, newest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError>;
}

/// Follow edges. Backed by a `(user_id, author_id)` uniqueness guarantee.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    /// Returns the edge and whether this call created it.
    async fn get_or_create(&self, user_id: i64, author_id: i64)
    -> Result<(Follow, bool), RepoError>;

    /// Fails with `NotFound` when no edge exists.
    async fn remove(&self, user_id: i64, author_id: i64) -> Result<(), RepoError>;

    /// Users following `user_id`.
    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, RepoError>;

    /// Users `user_id` follows.
    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, RepoError>;
}

/// Like edges. Backed by a `(user_id, post_id)` uniqueness guarantee.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn exists(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError>;

    /// Remove the like if present, otherwise add it, as one atomic step.
    /// Returns whether the post is liked afterwards.
    async fn toggle(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError>;

    async fn likers_of(&self, post_id: i64) -> Result<Vec<User>, RepoError>;
}

/// The full set of store handles, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub likes: Arc<dyn LikeRepository>,
}
