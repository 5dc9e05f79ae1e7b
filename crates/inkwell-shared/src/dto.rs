//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub date_joined: String,
}

/// Title and slug of the group a post belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLinkDto {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDto {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub group: Option<GroupLinkDto>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub creator_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
}

/// One page of a listing with its navigation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDto {
    pub query: String,
    pub posts: PageDto<PostDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowFeedDto {
    pub posts: PageDto<PostDto>,
    pub groups: Vec<GroupDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPageDto {
    pub group: GroupDto,
    pub posts: PageDto<PostDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPageDto {
    pub author: UserDto,
    pub following: bool,
    pub posts: PageDto<PostDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorGroupsDto {
    pub author: UserDto,
    pub groups: Vec<GroupDto>,
}

/// Followers or followees of one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListDto {
    pub user: UserDto,
    pub users: PageDto<UserDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailDto {
    pub post: PostDto,
    pub comments: Vec<CommentDto>,
    pub likers: Vec<UserDto>,
    pub like_count: usize,
}

/// `?page=` on list endpoints. Kept as text so garbage falls back to page 1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Body of the new/edit post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<String>,
}

/// Body of the comment form. Only the text is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupForm {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub bio: String,
    pub image: Option<String>,
}
