use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Statement, Value};

use inkwell_core::domain::{GroupLink, Post};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{
    BaseRepository, FollowRepository, LikeRepository, PostFilter, PostRepository,
    UserRepository,
};

use crate::database::entity::{follow, group, post, user};
use crate::database::postgres_repo::{
    PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresUserRepository,
};

fn post_model(id: i64, group_id: Option<i64>) -> post::Model {
    post::Model {
        id,
        author_id: 7,
        group_id,
        title: "Test Post".to_owned(),
        text: "Content".to_owned(),
        image: None,
        created_at: Utc::now().into(),
    }
}

fn user_model(id: i64, username: &str) -> user::Model {
    user::Model {
        id,
        username: username.to_owned(),
        date_joined: Utc::now().into(),
    }
}

/// Run one empty `list` page and hand back the SELECT it issued.
async fn listed_select(filter: PostFilter) -> Statement {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.list(&filter, 0, 10).await.unwrap().is_empty());

    let mut log = repo.db.into_transaction_log();
    assert_eq!(log.len(), 1);
    log.remove(0).statements()[0].clone()
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(3, None)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(3).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, 3);
    assert_eq!(post.author_id, 7);
}

#[tokio::test]
async fn test_find_user_by_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(7, "viki")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_username("viki").await.unwrap().unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "viki");
}

#[tokio::test]
async fn test_find_entry_joins_author_and_group() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(3, Some(2))]])
        .append_query_results(vec![vec![user_model(7, "viki")]])
        .append_query_results(vec![vec![group::Model {
            id: 2,
            title: "Rust".to_owned(),
            slug: "rust".to_owned(),
            description: String::new(),
            creator_id: Some(7),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let entry = repo.find_entry(3).await.unwrap().unwrap();
    assert_eq!(entry.author, "viki");
    assert_eq!(
        entry.group,
        Some(GroupLink {
            id: 2,
            title: "Rust".to_owned(),
            slug: "rust".to_owned(),
        })
    );
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = post_model(99, None).into();
    let result = repo.update(post).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_follow_get_or_create_reports_existing_edge() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results(vec![vec![follow::Model {
            id: 5,
            user_id: 1,
            author_id: 2,
        }]])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);

    let (edge, created) = repo.get_or_create(1, 2).await.unwrap();
    assert!(!created);
    assert_eq!(edge.id, 5);
}

#[tokio::test]
async fn test_unfollow_without_edge_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);

    assert!(matches!(repo.remove(1, 2).await, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_like_toggle_removes_existing_like() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);

    assert!(!repo.toggle(1, 3).await.unwrap());
}

#[tokio::test]
async fn test_search_matches_text_author_and_group_case_insensitively() {
    let stmt = listed_select(PostFilter::Search("Rust_50%".to_owned())).await;

    for column in [
        r#"LOWER("posts"."title") LIKE"#,
        r#"LOWER("posts"."text") LIKE"#,
        r#"LOWER("users"."username") LIKE"#,
        r#"LOWER("groups"."title") LIKE"#,
    ] {
        assert!(stmt.sql.contains(column), "missing {column} in {}", stmt.sql);
    }
    assert!(stmt.sql.contains(" ESCAPE "));
    assert!(stmt.sql.contains(r#"INNER JOIN "users""#));
    assert!(stmt.sql.contains(r#"LEFT JOIN "groups""#));
    assert!(stmt.sql.contains(" OR "));

    let values = stmt.values.unwrap().0;
    assert!(values.contains(&Value::from(r"%rust\_50\%%")));
}

#[tokio::test]
async fn test_followed_by_selects_authors_from_follow_edges() {
    let stmt = listed_select(PostFilter::FollowedBy(42)).await;

    assert!(
        stmt.sql.contains(r#""posts"."author_id" IN (SELECT"#),
        "{}",
        stmt.sql
    );
    assert!(stmt.sql.contains(r#"FROM "follows""#));
    assert!(stmt.sql.contains(r#""follows"."user_id" = $"#));
    assert!(stmt.sql.contains(r#"ORDER BY "posts"."created_at" DESC, "posts"."id" ASC"#));

    let values = stmt.values.unwrap().0;
    assert!(values.contains(&Value::from(42i64)));
}
