//! Author pages, the follow graph and account settings.

use actix_web::{HttpResponse, web};

use inkwell_core::domain::{ProfileChanges, User};
use inkwell_core::pagination::{AUTHOR_PAGE_SIZE, DEFAULT_PAGE_SIZE, paginate};
use inkwell_core::{PageRequest, Redirect};
use inkwell_shared::dto::{AuthorGroupsDto, AuthorPageDto, PageQuery, ProfileForm, UserListDto};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /{username}/ - the author's posts and whether the viewer follows them.
pub async fn profile(
    state: web::Data<AppState>,
    OptionalIdentity(viewer): OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let feed = state
        .feed
        .posts_of_author(
            &username,
            viewer.as_ref(),
            PageRequest::parse(query.page.as_deref(), DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(views::ok(AuthorPageDto {
        author: views::user(&feed.author),
        following: feed.following,
        posts: views::page(&feed.page, views::post),
    }))
}

/// GET /{username}/groups/
pub async fn author_groups(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let (author, groups) = state.feed.author_groups(&username).await?;

    Ok(views::ok(AuthorGroupsDto {
        author: views::user(&author),
        groups: groups.iter().map(views::group).collect(),
    }))
}

/// GET /followers/{username}/
pub async fn followers(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user = state.feed.author(&username).await?;
    let users = state.social.followers_of(user.id).await?;
    Ok(user_list(&user, users, &query))
}

/// GET /following/{username}/
pub async fn following(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user = state.feed.author(&username).await?;
    let users = state.social.following_of(user.id).await?;
    Ok(user_list(&user, users, &query))
}

fn user_list(user: &User, users: Vec<User>, query: &PageQuery) -> HttpResponse {
    let request = PageRequest::parse(query.page.as_deref(), AUTHOR_PAGE_SIZE);
    let page = paginate(users, request.page_size, request.number);

    views::ok(UserListDto {
        user: views::user(user),
        users: views::page(&page, views::user),
    })
}

/// GET|POST /{username}/follow/
pub async fn follow(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state.feed.author(&username).await?;
    state.social.follow(&actor, &author).await?;
    Ok(views::redirect(&Redirect::profile(author.username)))
}

/// GET|POST /{username}/unfollow/ - 404 when not following.
pub async fn unfollow(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state.feed.author(&username).await?;
    state.social.unfollow(&actor, &author).await?;
    Ok(views::redirect(&Redirect::profile(author.username)))
}

/// GET|POST /{username}/delete/ - users may only delete themselves.
pub async fn delete_user(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state.accounts.delete_user(&actor, &username).await?;
    Ok(views::outcome(outcome, |()| views::redirect(&Redirect::Index)))
}

/// GET /profile-settings/
pub async fn settings(
    state: web::Data<AppState>,
    Identity(actor): Identity,
) -> AppResult<HttpResponse> {
    let profile = state.accounts.settings(&actor).await?;
    Ok(views::ok(views::profile(&actor.username, &profile)))
}

/// POST /profile-settings/
pub async fn update_settings(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    form: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    state
        .accounts
        .update_settings(
            &actor,
            ProfileChanges {
                bio: form.bio,
                image: form.image,
            },
        )
        .await?;

    Ok(views::redirect(&Redirect::profile(actor.username)))
}
