//! Query/filter engine: every read-side listing the site serves.

use crate::domain::{CommentEntry, Group, PostEntry, User};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::ports::{PostFilter, Repositories};

use super::{Actor, SocialGraph, user_by_username};

/// An author's page: their posts plus whether the viewer follows them.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: User,
    pub following: bool,
    pub page: Page<PostEntry>,
}

/// A group with one page of its posts.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostEntry>,
}

/// A single post with its comments and likes.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub entry: PostEntry,
    pub comments: Vec<CommentEntry>,
    pub likers: Vec<User>,
}

#[derive(Clone)]
pub struct FeedQueries {
    repos: Repositories,
    social: SocialGraph,
}

impl FeedQueries {
    pub fn new(repos: Repositories) -> Self {
        let social = SocialGraph::new(repos.clone());
        Self { repos, social }
    }

    pub async fn author(&self, username: &str) -> Result<User, DomainError> {
        user_by_username(&self.repos, username).await
    }

    /// Every post, newest first.
    pub async fn index(&self, page: PageRequest) -> Result<Page<PostEntry>, DomainError> {
        self.list_posts(PostFilter::All, page).await
    }

    /// Posts whose title, text, author username or group title contains
    /// `query`, ignoring case. The empty query matches everything.
    pub async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        self.list_posts(PostFilter::Search(query.to_string()), page)
            .await
    }

    /// Posts by the authors `viewer` follows.
    pub async fn feed_for(
        &self,
        viewer: &Actor,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        self.list_posts(PostFilter::FollowedBy(viewer.user_id), page)
            .await
    }

    pub async fn posts_of_group(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<GroupFeed, DomainError> {
        let group = self
            .repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let page = self.list_posts(PostFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn posts_of_author(
        &self,
        username: &str,
        viewer: Option<&Actor>,
        page: PageRequest,
    ) -> Result<AuthorFeed, DomainError> {
        let author = self.author(username).await?;
        let page = self.list_posts(PostFilter::Author(author.id), page).await?;
        let following = self.social.is_following(viewer, author.id).await?;
        Ok(AuthorFeed {
            author,
            following,
            page,
        })
    }

    /// Groups ordered by title.
    pub async fn all_groups(&self, page: PageRequest) -> Result<Page<Group>, DomainError> {
        let total = self.repos.groups.count().await?;
        let window = page.window(total);
        let items = self.repos.groups.list(window.offset, window.limit).await?;
        Ok(Page::new(items, window.number, page.page_size, total))
    }

    /// Every group, unpaginated, for the followed-authors sidebar.
    pub async fn group_list(&self) -> Result<Vec<Group>, DomainError> {
        let total = self.repos.groups.count().await?;
        Ok(self.repos.groups.list(0, total).await?)
    }

    /// Users, most recently joined first.
    pub async fn all_authors(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let total = self.repos.users.count().await?;
        let window = page.window(total);
        let items = self.repos.users.list(window.offset, window.limit).await?;
        Ok(Page::new(items, window.number, page.page_size, total))
    }

    pub async fn author_groups(&self, username: &str) -> Result<(User, Vec<Group>), DomainError> {
        let creator = self.author(username).await?;
        let groups = self.repos.groups.list_by_creator(creator.id).await?;
        Ok((creator, groups))
    }

    /// The post `post_id`, provided it was written by `username`.
    pub async fn post_entry(&self, username: &str, post_id: i64) -> Result<PostEntry, DomainError> {
        self.repos
            .posts
            .find_entry(post_id)
            .await?
            .filter(|entry| entry.author == username)
            .ok_or_else(|| DomainError::not_found("post", format!("{username}/{post_id}")))
    }

    pub async fn post_detail(
        &self,
        username: &str,
        post_id: i64,
    ) -> Result<PostDetail, DomainError> {
        let entry = self.post_entry(username, post_id).await?;
        let comments = self.repos.comments.list_for_post(post_id).await?;
        let likers = self.social.likers_of(post_id).await?;
        Ok(PostDetail {
            entry,
            comments,
            likers,
        })
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        let total = self.repos.posts.count(&filter).await?;
        let window = page.window(total);
        let items = self
            .repos
            .posts
            .list(&filter, window.offset, window.limit)
            .await?;
        tracing::debug!(?filter, total, page = window.number, "Listed posts");
        Ok(Page::new(items, window.number, page.page_size, total))
    }
}
