//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use inkwell_core::domain::{
    Comment, CommentEntry, Follow, Group, GroupLink, NewComment, NewGroup, NewPost, Post,
    PostEntry, Profile, User,
};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, LikeRepository, PostFilter,
    PostRepository, ProfileRepository, Repositories, UserRepository,
};

use super::entity::{comment, follow, group, like, post, profile, user};
use super::postgres_base::{PostgresBaseRepository, db_err};

pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;
pub type PostgresProfileRepository = PostgresBaseRepository<profile::Entity>;
pub type PostgresGroupRepository = PostgresBaseRepository<group::Entity>;
pub type PostgresPostRepository = PostgresBaseRepository<post::Entity>;
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity>;
pub type PostgresFollowRepository = PostgresBaseRepository<follow::Entity>;
pub type PostgresLikeRepository = PostgresBaseRepository<like::Entity>;

/// Build the repository bundle over one connection pool.
pub fn postgres_repositories(db: DbConn) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        profiles: Arc::new(PostgresProfileRepository::new(db.clone())),
        groups: Arc::new(PostgresGroupRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        follows: Arc::new(PostgresFollowRepository::new(db.clone())),
        likes: Arc::new(PostgresLikeRepository::new(db)),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, username: &str) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            date_joined: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        tracing::debug!(user_id = model.id, username = %model.username, "User row inserted");
        Ok(model.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .order_by_desc(user::Column::DateJoined)
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn get_or_create(&self, user_id: i64) -> Result<Profile, RepoError> {
        profile::Entity::insert(profile::ActiveModel::from(Profile::empty(user_id)))
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        profile::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let content = group.content;
        let model = group::ActiveModel {
            title: Set(content.title),
            slug: Set(content.slug),
            description: Set(content.description),
            creator_id: Set(Some(group.creator_id)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = group::Entity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Group>, RepoError> {
        let result = group::Entity::find()
            .filter(group::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        group::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Group>, RepoError> {
        let result = group::Entity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Group>, RepoError> {
        let result = group::Entity::find()
            .filter(group::Column::CreatorId.eq(creator_id))
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn post_condition(filter: &PostFilter) -> Condition {
    match filter {
        PostFilter::All => Condition::all(),
        PostFilter::Author(author_id) => Condition::all().add(post::Column::AuthorId.eq(*author_id)),
        PostFilter::Group(group_id) => Condition::all().add(post::Column::GroupId.eq(*group_id)),
        PostFilter::FollowedBy(user_id) => Condition::all().add(
            post::Column::AuthorId.in_subquery(
                Query::select()
                    .column(follow::Column::AuthorId)
                    .from(follow::Entity)
                    .and_where(follow::Column::UserId.eq(*user_id))
                    .to_owned(),
            ),
        ),
        PostFilter::Search(query) => {
            let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
            let lower_like = |col: Expr| {
                Expr::expr(Func::lower(col)).like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            Condition::any()
                .add(lower_like(Expr::col((post::Entity, post::Column::Title))))
                .add(lower_like(Expr::col((post::Entity, post::Column::Text))))
                .add(lower_like(Expr::col((user::Entity, user::Column::Username))))
                .add(lower_like(Expr::col((group::Entity, group::Column::Title))))
        }
    }
}

impl PostgresPostRepository {
    fn select(filter: &PostFilter) -> sea_orm::Select<post::Entity> {
        post::Entity::find()
            .join(JoinType::InnerJoin, post::Relation::Author.def())
            .join(JoinType::LeftJoin, post::Relation::Group.def())
            .filter(post_condition(filter))
    }

    /// Attach author names and group links, two queries per page.
    async fn entries(&self, posts: Vec<post::Model>) -> Result<Vec<PostEntry>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        let authors: HashMap<i64, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let group_ids: Vec<i64> = posts.iter().filter_map(|p| p.group_id).collect();
        let groups: HashMap<i64, GroupLink> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            group::Entity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .iter()
                .map(|g| (g.id, GroupLink::from(g)))
                .collect()
        };

        Ok(posts
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().unwrap_or_default();
                let group = model.group_id.and_then(|id| groups.get(&id).cloned());
                PostEntry {
                    post: model.into(),
                    author,
                    group,
                }
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let content = post.content;
        let model = post::ActiveModel {
            author_id: Set(post.author_id),
            group_id: Set(content.group_id),
            title: Set(content.title),
            text: Set(content.text),
            image: Set(content.image),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(model.into())
    }

    async fn find_entry(&self, id: i64) -> Result<Option<PostEntry>, RepoError> {
        let Some(model) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        Ok(self.entries(vec![model]).await?.pop())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Self::select(filter).count(&self.db).await.map_err(db_err)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let posts = Self::select(filter)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.entries(posts).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            post_id: Set(comment.post_id),
            author_id: Set(comment.author_id),
            text: Set(comment.text),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentEntry {
                comment: comment.into(),
                author: author.map(|u| u.username).unwrap_or_default(),
            })
            .collect())
    }
}

impl PostgresFollowRepository {
    async fn edge(&self, user_id: i64, author_id: i64) -> Result<Option<follow::Model>, RepoError> {
        follow::Entity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        Ok(self.edge(user_id, author_id).await?.is_some())
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        // The unique index settles concurrent follows: the loser inserts nothing.
        let inserted = follow::Entity::insert(follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(db_err)?;

        let edge = self
            .edge(user_id, author_id)
            .await?
            .ok_or(RepoError::NotFound)?;
        Ok((edge.into(), inserted > 0))
    }

    async fn remove(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        let result = follow::Entity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .join_rev(JoinType::InnerJoin, follow::Relation::Follower.def())
            .filter(follow::Column::AuthorId.eq(user_id))
            .order_by_asc(follow::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .join_rev(JoinType::InnerJoin, follow::Relation::Author.def())
            .filter(follow::Column::UserId.eq(user_id))
            .order_by_asc(follow::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn exists(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        let found = like::Entity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(found.is_some())
    }

    async fn toggle(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let removed = like::Entity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?
            .rows_affected;

        let liked = if removed > 0 {
            false
        } else {
            like::Entity::insert(like::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(post_id),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([like::Column::UserId, like::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
            true
        };

        txn.commit().await.map_err(db_err)?;
        Ok(liked)
    }

    async fn likers_of(&self, post_id: i64) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .join_rev(JoinType::InnerJoin, like::Relation::User.def())
            .filter(like::Column::PostId.eq(post_id))
            .order_by_asc(like::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
