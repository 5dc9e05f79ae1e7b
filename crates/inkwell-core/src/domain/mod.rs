//! Domain entities - the core business objects.

mod comment;
mod edges;
mod group;
mod post;
mod user;
mod validation;

pub use comment::{Comment, CommentEntry, NewComment, validate_comment_text};
pub use edges::{Follow, Like};
pub use group::{GROUP_FIELD_MAX_CHARS, Group, GroupContent, NewGroup};
pub use post::{GroupLink, NewPost, Post, PostContent, PostEntry, TITLE_MAX_CHARS};
pub use user::{BIO_MAX_CHARS, Profile, ProfileChanges, User};
pub use validation::{FieldError, FieldErrors};
