//! Group mutations. Refusals send the user back to the group directory.

use actix_web::{HttpResponse, web};

use inkwell_core::Redirect;
use inkwell_core::domain::{Group, GroupContent};
use inkwell_shared::dto::GroupForm;

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn content(form: GroupForm) -> GroupContent {
    GroupContent {
        title: form.title,
        slug: form.slug,
        description: form.description,
    }
}

fn form(group: &Group) -> GroupForm {
    GroupForm {
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
    }
}

fn group_page(slug: &str) -> Redirect {
    Redirect::Path(format!("/group/{slug}/"))
}

/// GET /newgroup/
pub async fn new_group_form(_identity: Identity) -> HttpResponse {
    views::ok(GroupForm::default())
}

/// POST /newgroup/
pub async fn new_group(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    body: web::Json<GroupForm>,
) -> AppResult<HttpResponse> {
    state.groups.create(&actor, content(body.into_inner())).await?;
    Ok(views::redirect(&Redirect::AllGroups))
}

/// GET /{username}/{slug}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (username, slug) = path.into_inner();
    let outcome = state.groups.edit_form(&actor, &username, &slug).await?;
    Ok(views::outcome(outcome, |group| views::ok(form(&group))))
}

/// POST /{username}/{slug}/edit/ - lands on the group page, under its new slug.
pub async fn edit_group(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: web::Path<(String, String)>,
    body: web::Json<GroupForm>,
) -> AppResult<HttpResponse> {
    let (username, slug) = path.into_inner();
    let outcome = state
        .groups
        .edit(&actor, &username, &slug, content(body.into_inner()))
        .await?;
    Ok(views::outcome(outcome, |group| {
        views::redirect(&group_page(&group.slug))
    }))
}

/// GET|POST /{username}/{slug}/delete/
pub async fn delete_group(
    state: web::Data<AppState>,
    Identity(actor): Identity,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (username, slug) = path.into_inner();
    let outcome = state.groups.delete(&actor, &username, &slug).await?;
    Ok(views::outcome(outcome, |()| views::redirect(&Redirect::AllGroups)))
}
