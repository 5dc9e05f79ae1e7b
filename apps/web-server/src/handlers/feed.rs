//! Read-only listings: home feed, search, directories and group pages.

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};

use inkwell_core::PageRequest;
use inkwell_core::pagination::{AUTHOR_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use inkwell_core::services::FeedCache;
use inkwell_shared::ApiResponse;
use inkwell_shared::dto::{FollowFeedDto, GroupPageDto, PageQuery, SearchDto, SearchQuery};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn page_request(query: &PageQuery, page_size: u64) -> PageRequest {
    PageRequest::parse(query.page.as_deref(), page_size)
}

/// GET / - every post, newest first.
///
/// The serialized body is cached per query string; creating a post does not
/// evict it, so the page may be up to one TTL stale.
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = FeedCache::key(req.query_string());

    if let Some(body) = state.feed_cache.get(&key).await {
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    let page = state
        .feed
        .index(page_request(&query, DEFAULT_PAGE_SIZE))
        .await?;
    let body = serde_json::to_string(&ApiResponse::ok(views::page(&page, views::post)))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Err(e) = state.feed_cache.set(&key, &body).await {
        tracing::warn!(key = %key, error = %e, "Failed to cache home feed");
    }

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// GET /search/?q= - posts matching the query in any searchable field.
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let text = query.q.unwrap_or_default();
    let page = state
        .feed
        .search(
            &text,
            PageRequest::parse(query.page.as_deref(), DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(views::ok(SearchDto {
        query: text,
        posts: views::page(&page, views::post),
    }))
}

/// GET /follow/ - posts by the authors the viewer follows.
pub async fn follow_index(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .feed_for(&actor, page_request(&query, DEFAULT_PAGE_SIZE))
        .await?;
    let groups = state.feed.group_list().await?;

    Ok(views::ok(FollowFeedDto {
        posts: views::page(&page, views::post),
        groups: groups.iter().map(views::group).collect(),
    }))
}

/// GET /allgroups/
pub async fn all_groups(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .all_groups(page_request(&query, DEFAULT_PAGE_SIZE))
        .await?;

    Ok(views::ok(views::page(&page, views::group)))
}

/// GET /allauthors/
pub async fn all_authors(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .all_authors(page_request(&query, AUTHOR_PAGE_SIZE))
        .await?;

    Ok(views::ok(views::page(&page, views::user)))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let feed = state
        .feed
        .posts_of_group(&slug, page_request(&query, DEFAULT_PAGE_SIZE))
        .await?;

    Ok(views::ok(GroupPageDto {
        group: views::group(&feed.group),
        posts: views::page(&feed.page, views::post),
    }))
}
