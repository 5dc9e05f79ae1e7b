//! Route-level tests over the in-memory store and cache.

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use inkwell_core::domain::{PostContent, User};
use inkwell_core::ports::{Cache, TokenService};
use inkwell_core::services::{Actor, DEFAULT_FEED_TTL};
use inkwell_infra::{InMemoryCache, JwtConfig, JwtTokenService, MemoryStore};

use super::configure_routes;
use crate::config::SessionConfig;
use crate::state::AppState;

struct Harness {
    state: AppState,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new(feed_ttl: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let state = AppState::new(
            store.repositories(),
            cache,
            tokens,
            feed_ttl,
            SessionConfig::default(),
        );
        Self { state, store }
    }

    async fn user(&self, username: &str) -> (User, Cookie<'static>) {
        let user = self
            .store
            .repositories()
            .users
            .create(username)
            .await
            .unwrap();
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username)
            .unwrap();
        (user, Cookie::new("session", token))
    }

    async fn post(&self, author: &User, title: &str) -> i64 {
        self.state
            .posts
            .create(
                &Actor::from(author),
                PostContent {
                    title: title.to_string(),
                    text: format!("{title} body"),
                    ..PostContent::default()
                },
            )
            .await
            .unwrap()
            .id
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_rt::test]
async fn test_health() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let app = app!(harness);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_home_feed_is_served_from_cache_until_cleared() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (_, session) = harness.user("viki").await;
    let app = app!(harness);

    let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new/")
            .cookie(session)
            .set_json(json!({"title": "Fresh", "text": "Just written"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cached = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;
    assert_eq!(first, cached);

    harness.state.feed_cache.clear().await.unwrap();

    let fresh = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;
    assert_ne!(first, fresh);
    let body: Value = serde_json::from_slice(&fresh).unwrap();
    assert_eq!(body["data"]["items"][0]["title"], "Fresh");
}

#[actix_rt::test]
async fn test_home_feed_recomputes_after_ttl() {
    tokio::time::pause();
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (viki, _) = harness.user("viki").await;
    let app = app!(harness);

    let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;
    harness.post(&viki, "Later").await;

    tokio::time::advance(DEFAULT_FEED_TTL - Duration::from_secs(1)).await;
    let stale = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;
    assert_eq!(first, stale);

    tokio::time::advance(Duration::from_secs(1)).await;
    let fresh = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request())
        .await;
    assert_ne!(first, fresh);
    let body: Value = serde_json::from_slice(&fresh).unwrap();
    assert_eq!(body["data"]["items"][0]["title"], "Later");
}

#[actix_rt::test]
async fn test_pages_are_cached_separately() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (viki, _) = harness.user("viki").await;
    for i in 0..11 {
        harness.post(&viki, &format!("Post {i}")).await;
    }
    let app = app!(harness);

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=2").to_request(),
    )
    .await;

    assert_eq!(first["data"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(second["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(second["data"]["has_next"], false);
}

#[actix_rt::test]
async fn test_anonymous_user_is_sent_to_login() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let app = app!(harness);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/new/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fnew%2F");
}

#[actix_rt::test]
async fn test_unknown_group_is_not_found() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let app = app!(harness);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/nope/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_non_owner_edit_redirects_to_post() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (viki, _) = harness.user("viki").await;
    let (_, mallory) = harness.user("mallory").await;
    let post_id = harness.post(&viki, "Mine").await;
    let app = app!(harness);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/viki/{post_id}/edit/"))
            .cookie(mallory)
            .set_json(json!({"title": "Hijacked", "text": "oops"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/viki/{post_id}/"));

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/viki/{post_id}/"))
            .to_request(),
    )
    .await;
    assert_eq!(detail["data"]["post"]["title"], "Mine");
}

#[actix_rt::test]
async fn test_invalid_post_is_rejected_with_field_errors() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (_, session) = harness.user("viki").await;
    let app = app!(harness);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new/")
            .cookie(session)
            .set_json(json!({"title": "", "text": "body"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "title");
}

#[actix_rt::test]
async fn test_follow_redirects_to_profile() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (viki, _) = harness.user("viki").await;
    let (reader, session) = harness.user("reader").await;
    let app = app!(harness);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/viki/follow/")
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/viki/");

    let following = harness
        .state
        .social
        .is_following(Some(&Actor::from(&reader)), viki.id)
        .await
        .unwrap();
    assert!(following);

    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/viki/")
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(profile["data"]["following"], true);
}

#[actix_rt::test]
async fn test_like_returns_to_referrer() {
    let harness = Harness::new(DEFAULT_FEED_TTL);
    let (viki, session) = harness.user("viki").await;
    let post_id = harness.post(&viki, "Likeable").await;
    let app = app!(harness);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/viki/{post_id}/like/"))
            .insert_header((header::REFERER, "/search/?q=like"))
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/search/?q=like");

    let likers = harness.state.social.likers_of(post_id).await.unwrap();
    assert_eq!(likers.len(), 1);
}
