//! End-to-end service behaviour over the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use inkwell_core::domain::{GroupContent, PostContent, ProfileChanges, User};
use inkwell_core::ports::Repositories;
use inkwell_core::services::{
    AccountCommands, Actor, FeedQueries, GroupCommands, PostCommands, SocialGraph,
};
use inkwell_core::{DomainError, Outcome, PageRequest, Redirect};

use super::MemoryStore;

struct World {
    store: Arc<MemoryStore>,
    repos: Repositories,
}

impl World {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = store.repositories();
        Self { store, repos }
    }

    async fn user(&self, username: &str) -> (User, Actor) {
        let user = self.repos.users.create(username).await.unwrap();
        let actor = Actor::from(&user);
        (user, actor)
    }

    async fn post(&self, actor: &Actor, title: &str, text: &str) -> i64 {
        self.posts()
            .create(
                actor,
                PostContent {
                    title: title.to_string(),
                    text: text.to_string(),
                    ..PostContent::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    fn feed(&self) -> FeedQueries {
        FeedQueries::new(self.repos.clone())
    }

    fn social(&self) -> SocialGraph {
        SocialGraph::new(self.repos.clone())
    }

    fn posts(&self) -> PostCommands {
        PostCommands::new(self.repos.clone())
    }

    fn groups(&self) -> GroupCommands {
        GroupCommands::new(self.repos.clone())
    }

    fn accounts(&self) -> AccountCommands {
        AccountCommands::new(self.repos.clone())
    }
}

fn first_page() -> PageRequest {
    PageRequest::new(1, 10)
}

fn group(title: &str, slug: &str) -> GroupContent {
    GroupContent {
        title: title.to_string(),
        slug: slug.to_string(),
        description: String::new(),
    }
}

#[tokio::test]
async fn test_follow_is_idempotent_and_self_follow_ignored() {
    let world = World::new();
    let (a, actor_a) = world.user("a").await;
    let (b, _) = world.user("b").await;
    let social = world.social();

    assert!(social.follow(&actor_a, &b).await.unwrap());
    assert!(!social.follow(&actor_a, &b).await.unwrap());
    assert!(!social.follow(&actor_a, &a).await.unwrap());

    assert_eq!(social.followers_of(b.id).await.unwrap(), vec![a.clone()]);
    assert_eq!(social.following_of(a.id).await.unwrap(), vec![b]);
    assert!(social.followers_of(a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unfollow_without_edge_is_not_found() {
    let world = World::new();
    let (_, actor_a) = world.user("a").await;
    let (b, _) = world.user("b").await;

    let err = world.social().unfollow(&actor_a, &b).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "follow", .. }));
}

#[tokio::test]
async fn test_follow_then_unfollow_restores_state() {
    let world = World::new();
    let (_, actor_a) = world.user("a").await;
    let (b, _) = world.user("b").await;
    let social = world.social();

    social.follow(&actor_a, &b).await.unwrap();
    assert!(social.is_following(Some(&actor_a), b.id).await.unwrap());
    social.unfollow(&actor_a, &b).await.unwrap();

    assert!(!social.is_following(Some(&actor_a), b.id).await.unwrap());
    assert!(!social.is_following(None, b.id).await.unwrap());
}

#[tokio::test]
async fn test_like_toggle_parity() {
    let world = World::new();
    let (_, author) = world.user("author").await;
    let (reader, actor) = world.user("reader").await;
    let post_id = world.post(&author, "t", "body").await;
    let social = world.social();

    for n in 1..=5 {
        let liked = social.toggle_like(&actor, post_id).await.unwrap();
        assert_eq!(liked, n % 2 == 1);
    }

    assert_eq!(social.likers_of(post_id).await.unwrap(), vec![reader]);
}

#[tokio::test]
async fn test_search_is_a_case_insensitive_union() {
    let world = World::new();
    let (_, ivan) = world.user("ivan").await;
    let (_, olga) = world.user("olga").await;

    let by_title = world.post(&olga, "Привет мир", "body").await;
    let by_text = world.post(&olga, "Note", "сказал ПРИВЕТ").await;
    let by_author = world.post(&ivan, "Note", "unrelated").await;
    world.post(&olga, "Note", "nothing here").await;

    let feed = world.feed();
    let mut ids: Vec<i64> = feed
        .search("привет", first_page())
        .await
        .unwrap()
        .items
        .iter()
        .map(|e| e.id())
        .collect();
    ids.sort();
    assert_eq!(ids, vec![by_title, by_text]);

    let page = feed.search("IVAN", first_page()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id(), by_author);

    assert_eq!(feed.search("", first_page()).await.unwrap().total, 4);
}

#[tokio::test]
async fn test_search_matches_group_title() {
    let world = World::new();
    let (_, actor) = world.user("writer").await;
    let g = world
        .groups()
        .create(&actor, group("Cats of Rust", "cats"))
        .await
        .unwrap();
    let post = world
        .posts()
        .create(
            &actor,
            PostContent {
                title: "Whiskers".to_string(),
                text: "meow".to_string(),
                group_id: Some(g.id),
                ..PostContent::default()
            },
        )
        .await
        .unwrap();

    let page = world.feed().search("cats of", first_page()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id(), post.id);
    assert_eq!(page.items[0].group.as_ref().map(|g| g.slug.as_str()), Some("cats"));
}

#[tokio::test]
async fn test_listing_is_newest_first_with_id_tie_break() {
    let world = World::new();
    let (_, actor) = world.user("writer").await;

    world
        .store
        .set_clock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .await;
    let old_a = world.post(&actor, "Note", "old a").await;
    let old_b = world.post(&actor, "Note", "old b").await;
    world
        .store
        .set_clock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .await;
    let new = world.post(&actor, "Note", "new").await;

    let ids: Vec<i64> = world
        .feed()
        .index(first_page())
        .await
        .unwrap()
        .items
        .iter()
        .map(|e| e.id())
        .collect();
    assert_eq!(ids, vec![new, old_a, old_b]);
}

#[tokio::test]
async fn test_index_pages_clamp() {
    let world = World::new();
    let (_, actor) = world.user("writer").await;
    for i in 0..13 {
        world.post(&actor, "Note", &format!("post {i}")).await;
    }
    let feed = world.feed();

    let last = feed.index(PageRequest::new(2, 10)).await.unwrap();
    assert_eq!(last.items.len(), 3);
    assert_eq!(last.num_pages(), 2);

    let beyond = feed.index(PageRequest::new(99, 10)).await.unwrap();
    assert_eq!(beyond.number, 2);
    assert_eq!(beyond.items, last.items);
}

#[tokio::test]
async fn test_feed_for_only_contains_followed_authors() {
    let world = World::new();
    let (_, viewer) = world.user("viewer").await;
    let (followed, followed_actor) = world.user("followed").await;
    let (_, stranger) = world.user("stranger").await;

    let wanted = world.post(&followed_actor, "Note", "from followed").await;
    world.post(&stranger, "Note", "from stranger").await;
    world.post(&viewer, "Note", "own post").await;

    let feed = world.feed();
    assert_eq!(feed.feed_for(&viewer, first_page()).await.unwrap().total, 0);

    world.social().follow(&viewer, &followed).await.unwrap();
    let page = feed.feed_for(&viewer, first_page()).await.unwrap();
    assert_eq!(page.items.iter().map(|e| e.id()).collect::<Vec<_>>(), vec![wanted]);
}

#[tokio::test]
async fn test_author_feed_reports_following() {
    let world = World::new();
    let (_, viewer) = world.user("viewer").await;
    let (author, author_actor) = world.user("author").await;
    world.post(&author_actor, "Note", "hello").await;
    world.social().follow(&viewer, &author).await.unwrap();

    let feed = world.feed();
    let seen = feed
        .posts_of_author("author", Some(&viewer), first_page())
        .await
        .unwrap();
    assert!(seen.following);
    assert_eq!(seen.page.total, 1);

    let anonymous = feed.posts_of_author("author", None, first_page()).await.unwrap();
    assert!(!anonymous.following);
}

#[tokio::test]
async fn test_unknown_group_and_author_are_not_found() {
    let world = World::new();
    let feed = world.feed();

    assert!(matches!(
        feed.posts_of_group("nope", first_page()).await,
        Err(DomainError::NotFound { entity_type: "group", .. })
    ));
    assert!(matches!(
        feed.posts_of_author("ghost", None, first_page()).await,
        Err(DomainError::NotFound { entity_type: "user", .. })
    ));
}

#[tokio::test]
async fn test_post_under_wrong_author_is_not_found() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    world.user("bob").await;
    let post_id = world.post(&alice, "Note", "mine").await;

    assert!(world.feed().post_entry("alice", post_id).await.is_ok());
    assert!(matches!(
        world.feed().post_entry("bob", post_id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_non_owner_edit_and_delete_redirect_without_change() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let (_, mallory) = world.user("mallory").await;
    let post_id = world.post(&alice, "title", "original").await;
    let posts = world.posts();

    let edit = posts
        .edit(
            &mallory,
            "alice",
            post_id,
            PostContent {
                text: "defaced".to_string(),
                ..PostContent::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edit, Outcome::Redirect(Redirect::post("alice", post_id)));

    let delete = posts.delete(&mallory, "alice", post_id).await.unwrap();
    assert_eq!(delete, Outcome::Redirect(Redirect::post("alice", post_id)));

    let entry = world.feed().post_entry("alice", post_id).await.unwrap();
    assert_eq!(entry.post.text, "original");
    assert_eq!(entry.post.title, "title");
}

#[tokio::test]
async fn test_owner_edit_keeps_author_and_timestamp() {
    let world = World::new();
    let (alice_user, alice) = world.user("alice").await;
    let post_id = world.post(&alice, "t", "before").await;
    let before = world.feed().post_entry("alice", post_id).await.unwrap();

    let outcome = world
        .posts()
        .edit(
            &alice,
            "alice",
            post_id,
            PostContent {
                title: "t2".to_string(),
                text: "after".to_string(),
                ..PostContent::default()
            },
        )
        .await
        .unwrap();

    let Outcome::Done(post) = outcome else {
        panic!("owner edit was refused");
    };
    assert_eq!(post.text, "after");
    assert_eq!(post.author_id, alice_user.id);
    assert_eq!(post.created_at, before.post.created_at);
}

#[tokio::test]
async fn test_post_validation() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let posts = world.posts();

    let err = posts
        .create(
            &alice,
            PostContent {
                title: "x".repeat(51),
                text: String::new(),
                group_id: Some(404),
                image: None,
            },
        )
        .await
        .unwrap_err();

    let DomainError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "text", "group"]);
    assert_eq!(world.feed().index(first_page()).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_comment_author_is_the_actor() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let (bob_user, bob) = world.user("bob").await;
    let post_id = world.post(&alice, "Note", "post").await;

    let comment = world
        .posts()
        .add_comment(&bob, "alice", post_id, "hi".to_string())
        .await
        .unwrap();
    assert_eq!(comment.author_id, bob_user.id);
    assert_eq!(comment.post_id, post_id);

    let detail = world.feed().post_detail("alice", post_id).await.unwrap();
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].author, "bob");
}

#[tokio::test]
async fn test_comment_edit_by_other_user_redirects() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let (_, bob) = world.user("bob").await;
    let post_id = world.post(&alice, "Note", "post").await;
    let posts = world.posts();
    let comment = posts
        .add_comment(&bob, "alice", post_id, "bob's".to_string())
        .await
        .unwrap();

    let outcome = posts
        .edit_comment(&alice, "alice", post_id, comment.id, "rewritten".to_string())
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Redirect(Redirect::post("alice", post_id)));

    let outcome = posts
        .delete_comment(&alice, "alice", post_id, comment.id)
        .await
        .unwrap();
    assert!(!matches!(outcome, Outcome::Done(_)));

    let detail = world.feed().post_detail("alice", post_id).await.unwrap();
    assert_eq!(detail.comments[0].comment.text, "bob's");

    let outcome = posts
        .delete_comment(&bob, "alice", post_id, comment.id)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Done(_)));
}

#[tokio::test]
async fn test_group_uniqueness_is_a_field_error() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let groups = world.groups();
    groups.create(&alice, group("Rust", "rust")).await.unwrap();

    let err = groups.create(&alice, group("Rust", "rust-2")).await.unwrap_err();
    let DomainError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors[0].field, "title");

    let err = groups.create(&alice, group("Bad", "not a slug")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_group_changes_require_creator() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let (_, bob) = world.user("bob").await;
    let groups = world.groups();
    groups.create(&alice, group("Rust", "rust")).await.unwrap();

    let outcome = groups
        .edit(&bob, "alice", "rust", group("Mine", "mine"))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Redirect(Redirect::AllGroups));
    assert_eq!(
        groups.delete(&bob, "alice", "rust").await.unwrap(),
        Outcome::Redirect(Redirect::AllGroups)
    );

    let outcome = groups
        .edit(&alice, "alice", "rust", group("Rust", "rust"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Done(_)));
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let world = World::new();
    let (alice_user, alice) = world.user("alice").await;
    let (bob_user, bob) = world.user("bob").await;

    let g = world.groups().create(&alice, group("Rust", "rust")).await.unwrap();
    let alice_post = world.post(&alice, "Note", "alice").await;
    let bob_post = world.post(&bob, "Note", "bob").await;
    world
        .posts()
        .add_comment(&alice, "bob", bob_post, "from alice".to_string())
        .await
        .unwrap();
    world.social().toggle_like(&alice, bob_post).await.unwrap();
    world.social().follow(&alice, &bob_user).await.unwrap();
    world.social().follow(&bob, &alice_user).await.unwrap();
    world.accounts().settings(&alice).await.unwrap();

    let refused = world.accounts().delete_user(&bob, "alice").await.unwrap();
    assert_eq!(refused, Outcome::Redirect(Redirect::profile("bob")));

    let done = world.accounts().delete_user(&alice, "alice").await.unwrap();
    assert!(matches!(done, Outcome::Done(_)));

    let feed = world.feed();
    assert!(world.repos.users.find_by_username("alice").await.unwrap().is_none());
    assert!(feed.post_entry("alice", alice_post).await.is_err());
    let detail = feed.post_detail("bob", bob_post).await.unwrap();
    assert!(detail.comments.is_empty());
    assert!(detail.likers.is_empty());
    assert!(world.social().followers_of(bob_user.id).await.unwrap().is_empty());
    assert!(world.social().following_of(bob_user.id).await.unwrap().is_empty());
    assert!(world.repos.profiles.find_by_id(alice_user.id).await.unwrap().is_none());

    let group = world.repos.groups.find_by_slug("rust").await.unwrap().unwrap();
    assert_eq!(group.id, g.id);
    assert_eq!(group.creator_id, None);
}

#[tokio::test]
async fn test_profile_settings() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    let accounts = world.accounts();

    let profile = accounts.settings(&alice).await.unwrap();
    assert!(profile.bio.is_empty());

    let updated = accounts
        .update_settings(
            &alice,
            ProfileChanges {
                bio: "hello".to_string(),
                image: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, "hello");

    let err = accounts
        .update_settings(
            &alice,
            ProfileChanges {
                bio: "x".repeat(501),
                image: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_directories() {
    let world = World::new();
    let (_, alice) = world.user("alice").await;
    world.user("bob").await;
    let groups = world.groups();
    groups.create(&alice, group("Zed", "zed")).await.unwrap();
    groups.create(&alice, group("Alpha", "alpha")).await.unwrap();

    let feed = world.feed();
    let titles: Vec<String> = feed
        .all_groups(first_page())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, vec!["Alpha", "Zed"]);

    assert_eq!(feed.all_authors(PageRequest::new(1, 20)).await.unwrap().total, 2);

    let (creator, created) = feed.author_groups("alice").await.unwrap();
    assert_eq!(creator.username, "alice");
    assert_eq!(created.len(), 2);
}
