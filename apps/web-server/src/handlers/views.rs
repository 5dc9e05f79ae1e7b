//! Domain to wire conversions and response helpers shared by the handlers.

use actix_web::HttpResponse;
use actix_web::http::header;
use serde::Serialize;

use inkwell_core::domain::{CommentEntry, Group, PostEntry, Profile, User};
use inkwell_core::{Outcome, Page, Redirect};
use inkwell_shared::ApiResponse;
use inkwell_shared::dto::{
    CommentDto, GroupDto, GroupLinkDto, PageDto, PostDto, ProfileDto, UserDto,
};

pub fn user(user: &User) -> UserDto {
    UserDto {
        id: user.id,
        username: user.username.clone(),
        date_joined: user.date_joined.to_rfc3339(),
    }
}

pub fn post(entry: &PostEntry) -> PostDto {
    PostDto {
        id: entry.post.id,
        author: entry.author.clone(),
        title: entry.post.title.clone(),
        text: entry.post.text.clone(),
        image: entry.post.image.clone(),
        group: entry.group.as_ref().map(|g| GroupLinkDto {
            title: g.title.clone(),
            slug: g.slug.clone(),
        }),
        created_at: entry.post.created_at.to_rfc3339(),
    }
}

pub fn group(group: &Group) -> GroupDto {
    GroupDto {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
        creator_id: group.creator_id,
    }
}

pub fn comment(entry: &CommentEntry) -> CommentDto {
    CommentDto {
        id: entry.comment.id,
        author: entry.author.clone(),
        text: entry.comment.text.clone(),
        created_at: entry.comment.created_at.to_rfc3339(),
    }
}

pub fn profile(username: &str, profile: &Profile) -> ProfileDto {
    ProfileDto {
        username: username.to_string(),
        bio: profile.bio.clone(),
        image: profile.image.clone(),
    }
}

pub fn page<T, U>(page: &Page<T>, item: impl Fn(&T) -> U) -> PageDto<U> {
    PageDto {
        items: page.items.iter().map(item).collect(),
        number: page.number,
        num_pages: page.num_pages(),
        count: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page_number: page.next_page_number(),
        previous_page_number: page.previous_page_number(),
    }
}

/// `200 OK` with the `{"success": true, "data": ...}` envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

/// `302 Found` to `location`.
pub fn found(location: impl ToString) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Follow a refusal redirect, or render the performed mutation with `done`.
pub fn outcome<T>(outcome: Outcome<T>, done: impl FnOnce(T) -> HttpResponse) -> HttpResponse {
    match outcome {
        Outcome::Done(value) => done(value),
        Outcome::Redirect(target) => redirect(&target),
    }
}

pub fn redirect(target: &Redirect) -> HttpResponse {
    found(target.location())
}
