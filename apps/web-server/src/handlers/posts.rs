//! Post pages and the post/comment/like mutations.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

use inkwell_core::Redirect;
use inkwell_core::domain::{Post, PostContent};
use inkwell_shared::dto::{CommentForm, PostDetailDto, PostForm};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// URL segments of `/{username}/{post_id}/...`.
type PostPath = web::Path<(String, i64)>;
/// URL segments of `/{username}/{post_id}/comment/{comment_id}/...`.
type CommentPath = web::Path<(String, i64, i64)>;

fn content(form: PostForm) -> PostContent {
    PostContent {
        title: form.title,
        text: form.text,
        group_id: form.group,
        image: form.image.filter(|s| !s.is_empty()),
    }
}

fn form(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        group: post.group_id,
        image: post.image.clone(),
    }
}

/// GET /new/ - an empty post form.
pub async fn new_post_form(_identity: Identity) -> HttpResponse {
    views::ok(PostForm::default())
}

/// POST /new/
pub async fn new_post(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    state.posts.create(&actor, content(body.into_inner())).await?;
    Ok(views::redirect(&Redirect::Index))
}

/// GET /{username}/{post_id}/
pub async fn post_view(state: web::Data<AppState>, path: PostPath) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let detail = state.feed.post_detail(&username, post_id).await?;

    Ok(views::ok(PostDetailDto {
        post: views::post(&detail.entry),
        comments: detail.comments.iter().map(views::comment).collect(),
        like_count: detail.likers.len(),
        likers: detail.likers.iter().map(views::user).collect(),
    }))
}

/// GET /{username}/{post_id}/edit/ - current values, owner only.
pub async fn edit_form(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: PostPath,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let outcome = state.posts.edit_form(&actor, &username, post_id).await?;
    Ok(views::outcome(outcome, |post| views::ok(form(&post))))
}

/// POST /{username}/{post_id}/edit/
pub async fn edit_post(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: PostPath,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let outcome = state
        .posts
        .edit(&actor, &username, post_id, content(body.into_inner()))
        .await?;

    Ok(views::outcome(outcome, |post| {
        views::redirect(&Redirect::post(username.as_str(), post.id))
    }))
}

/// GET|POST /{username}/{post_id}/delete/
pub async fn delete_post(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: PostPath,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let outcome = state.posts.delete(&actor, &username, post_id).await?;
    Ok(views::outcome(outcome, |()| {
        views::redirect(&Redirect::profile(username.as_str()))
    }))
}

/// GET|POST /{username}/{post_id}/like/ - back to the referring page.
pub async fn like(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: PostPath,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let entry = state.feed.post_entry(&username, post_id).await?;
    state.social.toggle_like(&actor, entry.id()).await?;

    let back = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(|referer| Redirect::Path(referer.to_string()))
        .unwrap_or_else(|| Redirect::post(username, post_id));
    Ok(views::redirect(&back))
}

/// POST /{username}/{post_id}/comment/
pub async fn add_comment(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: PostPath,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    state
        .posts
        .add_comment(&actor, &username, post_id, body.into_inner().text)
        .await?;
    Ok(views::redirect(&Redirect::post(username, post_id)))
}

/// POST /{username}/{post_id}/comment/{comment_id}/edit/
pub async fn edit_comment(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: CommentPath,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id, comment_id) = path.into_inner();
    let outcome = state
        .posts
        .edit_comment(&actor, &username, post_id, comment_id, body.into_inner().text)
        .await?;
    Ok(views::outcome(outcome, |_| {
        views::redirect(&Redirect::post(username.as_str(), post_id))
    }))
}

/// GET|POST /{username}/{post_id}/comment/{comment_id}/delete/
pub async fn delete_comment(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: CommentPath,
) -> AppResult<HttpResponse> {
    let (username, post_id, comment_id) = path.into_inner();
    let outcome = state
        .posts
        .delete_comment(&actor, &username, post_id, comment_id)
        .await?;
    Ok(views::outcome(outcome, |()| {
        views::redirect(&Redirect::post(username.as_str(), post_id))
    }))
}
