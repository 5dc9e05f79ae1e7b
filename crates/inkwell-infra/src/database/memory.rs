//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All tables sit behind one async `RwLock`. Every mutation runs under the
//! write lock, which makes it the single writer that keeps follow and like
//! edges unique and applies the same cascade rules as the SQL schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use inkwell_core::domain::{
    Comment, CommentEntry, Follow, Group, GroupLink, Like, NewComment, NewGroup, NewPost, Post,
    PostEntry, Profile, User,
};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, LikeRepository,
    PostFilter, PostRepository, ProfileRepository, Repositories, UserRepository,
};

#[derive(Default)]
struct Sequences {
    users: i64,
    groups: i64,
    posts: i64,
    comments: i64,
    follows: i64,
    likes: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, Profile>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<i64, Follow>,
    likes: BTreeMap<i64, Like>,
    /// Timestamp stamped on new rows instead of the wall clock.
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    fn entry(&self, post: &Post) -> PostEntry {
        PostEntry {
            post: post.clone(),
            author: self
                .users
                .get(&post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group: post
                .group_id
                .and_then(|id| self.groups.get(&id))
                .map(|g| GroupLink {
                    id: g.id,
                    title: g.title.clone(),
                    slug: g.slug.clone(),
                }),
        }
    }

    fn matches(&self, post: &Post, filter: &PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Author(author_id) => post.author_id == *author_id,
            PostFilter::Group(group_id) => post.group_id == Some(*group_id),
            PostFilter::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == *user_id && f.author_id == post.author_id),
            PostFilter::Search(query) => {
                let needle = query.to_lowercase();
                let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
                let entry = self.entry(post);
                contains(&post.title)
                    || contains(&post.text)
                    || contains(&entry.author)
                    || entry.group.is_some_and(|g| contains(&g.title))
            }
        }
    }

    /// Matching posts, newest first, equal timestamps in id order.
    fn select(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| self.matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        posts
    }

    fn users_by_id(&self, ids: impl Iterator<Item = i64>) -> Vec<User> {
        ids.filter_map(|id| self.users.get(&id).cloned()).collect()
    }

    fn delete_post(&mut self, post_id: i64) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
        self.likes.retain(|_, l| l.post_id != post_id);
    }

    fn delete_user(&mut self, user_id: i64) {
        let owned: Vec<i64> = self
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            self.delete_post(post_id);
        }

        self.comments.retain(|_, c| c.author_id != user_id);
        self.likes.retain(|_, l| l.user_id != user_id);
        self.follows
            .retain(|_, f| f.user_id != user_id && f.author_id != user_id);
        self.profiles.remove(&user_id);
        for group in self.groups.values_mut() {
            if group.creator_id == Some(user_id) {
                group.creator_id = None;
            }
        }
        self.users.remove(&user_id);
    }

    fn group_conflict(&self, title: &str, slug: &str, except: Option<i64>) -> bool {
        self.groups
            .values()
            .any(|g| Some(g.id) != except && (g.title == title || g.slug == slug))
    }
}

/// In-memory store implementing every repository port.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Stamp rows created from now on with `now` instead of the wall clock.
    pub async fn set_clock(&self, now: DateTime<Utc>) {
        self.tables.write().await.clock = Some(now);
    }

    /// Wrap a shared store into the repository bundle used by the services.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            profiles: self.clone(),
            groups: self.clone(),
            posts: self.clone(),
            comments: self.clone(),
            follows: self.clone(),
            likes: self.clone(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }
        let slot = tables.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.delete_user(id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        if tables.users.values().any(|u| u.username == username) {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }
        let user = User {
            id: next(&mut tables.seq.users),
            username: username.to_string(),
            date_joined: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<&User> = tables.users.values().collect();
        users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined).then(a.id.cmp(&b.id)));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Profile, i64> for MemoryStore {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<Profile>, RepoError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .profiles
            .get_mut(&profile.user_id)
            .ok_or(RepoError::NotFound)?;
        *slot = profile.clone();
        Ok(profile)
    }

    async fn delete(&self, user_id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .profiles
            .remove(&user_id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn get_or_create(&self, user_id: i64) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(RepoError::Constraint("profile owner does not exist".to_string()));
        }
        Ok(tables
            .profiles
            .entry(user_id)
            .or_insert_with(|| Profile::empty(user_id))
            .clone())
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.group_conflict(&group.title, &group.slug, Some(group.id)) {
            return Err(RepoError::Constraint("group title or slug taken".to_string()));
        }
        let slot = tables.groups.get_mut(&group.id).ok_or(RepoError::NotFound)?;
        *slot = group.clone();
        Ok(group)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.groups.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        let content = group.content;
        if tables.group_conflict(&content.title, &content.slug, None) {
            return Err(RepoError::Constraint("group title or slug taken".to_string()));
        }
        let group = Group {
            id: next(&mut tables.seq.groups),
            title: content.title,
            slug: content.slug,
            description: content.description,
            creator_id: Some(group.creator_id),
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.title == title).cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.groups.len() as u64)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<&Group> = tables.groups.values().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables
            .groups
            .values()
            .filter(|g| g.creator_id == Some(creator_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.delete_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        let content = post.content;
        let post = Post {
            id: next(&mut tables.seq.posts),
            author_id: post.author_id,
            group_id: content.group_id,
            title: content.title,
            text: content.text,
            image: content.image,
            created_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_entry(&self, id: i64) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.entry(p)))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.select(filter).len() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .select(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| tables.entry(p))
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .get_mut(&comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        if !tables.posts.contains_key(&comment.post_id)
            || !tables.users.contains_key(&comment.author_id)
        {
            return Err(RepoError::Constraint("comment references a missing row".to_string()));
        }
        let comment = Comment {
            id: next(&mut tables.seq.comments),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(comments
            .into_iter()
            .map(|c| CommentEntry {
                comment: c.clone(),
                author: tables
                    .users
                    .get(&c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok((existing.clone(), false));
        }
        if !tables.users.contains_key(&user_id) || !tables.users.contains_key(&author_id) {
            return Err(RepoError::Constraint("follow references a missing user".to_string()));
        }
        let follow = Follow {
            id: next(&mut tables.seq.follows),
            user_id,
            author_id,
        };
        tables.follows.insert(follow.id, follow.clone());
        Ok((follow, true))
    }

    async fn remove(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let id = tables
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .map(|f| f.id)
            .ok_or(RepoError::NotFound)?;
        tables.follows.remove(&id);
        Ok(())
    }

    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let ids = tables
            .follows
            .values()
            .filter(|f| f.author_id == user_id)
            .map(|f| f.user_id);
        Ok(tables.users_by_id(ids))
    }

    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let ids = tables
            .follows
            .values()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id);
        Ok(tables.users_by_id(ids))
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn exists(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .values()
            .any(|l| l.user_id == user_id && l.post_id == post_id))
    }

    async fn toggle(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
            .map(|l| l.id);

        match existing {
            Some(id) => {
                tables.likes.remove(&id);
                Ok(false)
            }
            None => {
                if !tables.users.contains_key(&user_id) || !tables.posts.contains_key(&post_id) {
                    return Err(RepoError::Constraint("like references a missing row".to_string()));
                }
                let like = Like {
                    id: next(&mut tables.seq.likes),
                    user_id,
                    post_id,
                };
                tables.likes.insert(like.id, like);
                Ok(true)
            }
        }
    }

    async fn likers_of(&self, post_id: i64) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let ids = tables
            .likes
            .values()
            .filter(|l| l.post_id == post_id)
            .map(|l| l.user_id);
        Ok(tables.users_by_id(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::domain::{GroupContent, PostContent};

    async fn seeded() -> (Arc<MemoryStore>, Repositories) {
        let store = Arc::new(MemoryStore::new());
        let repos = store.repositories();
        (store, repos)
    }

    fn content(text: &str) -> PostContent {
        PostContent {
            text: text.to_string(),
            ..PostContent::default()
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let (_store, repos) = seeded().await;
        repos.users.create("viki").await.unwrap();

        let result = repos.users.create("viki").await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_follow_get_or_create_is_idempotent() {
        let (_store, repos) = seeded().await;
        let a = repos.users.create("a").await.unwrap();
        let b = repos.users.create("b").await.unwrap();

        let (first, created) = repos.follows.get_or_create(a.id, b.id).await.unwrap();
        assert!(created);
        let (second, created) = repos.follows.get_or_create(a.id, b.id).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(repos.follows.followers_of(b.id).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_concurrent_follows_create_one_edge() {
        let (_store, repos) = seeded().await;
        let a = repos.users.create("a").await.unwrap();
        let b = repos.users.create("b").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let follows = repos.follows.clone();
            handles.push(tokio::spawn(async move {
                follows.get_or_create(a.id, b.id).await.unwrap().1
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repos.follows.following_of(a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_follow_is_not_found() {
        let (_store, repos) = seeded().await;
        let a = repos.users.create("a").await.unwrap();
        let b = repos.users.create("b").await.unwrap();

        assert!(matches!(
            repos.follows.remove(a.id, b.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_group_delete_detaches_posts() {
        let (_store, repos) = seeded().await;
        let author = repos.users.create("author").await.unwrap();
        let group = repos
            .groups
            .create(NewGroup {
                creator_id: author.id,
                content: GroupContent {
                    title: "Rust".to_string(),
                    slug: "rust".to_string(),
                    description: String::new(),
                },
            })
            .await
            .unwrap();
        let post = repos
            .posts
            .create(NewPost {
                author_id: author.id,
                content: PostContent {
                    group_id: Some(group.id),
                    ..content("grouped")
                },
            })
            .await
            .unwrap();

        repos.groups.delete(group.id).await.unwrap();

        let post = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.group_id, None);
    }

    #[tokio::test]
    async fn test_post_delete_cascades_comments_and_likes() {
        let (_store, repos) = seeded().await;
        let author = repos.users.create("author").await.unwrap();
        let reader = repos.users.create("reader").await.unwrap();
        let post = repos
            .posts
            .create(NewPost {
                author_id: author.id,
                content: content("text"),
            })
            .await
            .unwrap();
        let comment = repos
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id: reader.id,
                text: "nice".to_string(),
            })
            .await
            .unwrap();
        repos.likes.toggle(reader.id, post.id).await.unwrap();

        repos.posts.delete(post.id).await.unwrap();

        assert!(repos.comments.find_by_id(comment.id).await.unwrap().is_none());
        assert!(!repos.likes.exists(reader.id, post.id).await.unwrap());
    }
}
