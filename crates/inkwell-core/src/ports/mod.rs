//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use repository::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, LikeRepository,
    PostFilter, PostRepository, ProfileRepository, Repositories, UserRepository,
};
