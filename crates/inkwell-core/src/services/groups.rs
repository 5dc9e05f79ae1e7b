//! Group mutations. Only a group's creator may change or remove it.

use crate::domain::{FieldErrors, Group, GroupContent, NewGroup};
use crate::error::{DomainError, RepoError};
use crate::outcome::{Outcome, Redirect};
use crate::ports::Repositories;

use super::{Actor, user_by_username};

#[derive(Clone)]
pub struct GroupCommands {
    repos: Repositories,
}

impl GroupCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, actor: &Actor, content: GroupContent) -> Result<Group, DomainError> {
        self.validate(&content, None).await?;

        let group = self
            .repos
            .groups
            .create(NewGroup {
                creator_id: actor.user_id,
                content,
            })
            .await
            .map_err(taken)?;

        tracing::info!(slug = %group.slug, creator = %actor.username, "Group created");
        Ok(group)
    }

    pub async fn edit_form(
        &self,
        actor: &Actor,
        username: &str,
        slug: &str,
    ) -> Result<Outcome<Group>, DomainError> {
        let group = self.load(username, slug).await?;
        Ok(check_creator(actor, group))
    }

    pub async fn edit(
        &self,
        actor: &Actor,
        username: &str,
        slug: &str,
        content: GroupContent,
    ) -> Result<Outcome<Group>, DomainError> {
        let mut group = match check_creator(actor, self.load(username, slug).await?) {
            Outcome::Done(group) => group,
            Outcome::Redirect(target) => return Ok(Outcome::Redirect(target)),
        };

        self.validate(&content, Some(group.id)).await?;
        group.apply(content);
        let group = self.repos.groups.update(group).await.map_err(taken)?;

        tracing::info!(slug = %group.slug, creator = %actor.username, "Group updated");
        Ok(Outcome::Done(group))
    }

    /// Remove a group. Its posts stay, detached from any group.
    pub async fn delete(
        &self,
        actor: &Actor,
        username: &str,
        slug: &str,
    ) -> Result<Outcome<()>, DomainError> {
        let group = match check_creator(actor, self.load(username, slug).await?) {
            Outcome::Done(group) => group,
            Outcome::Redirect(target) => return Ok(Outcome::Redirect(target)),
        };

        self.repos.groups.delete(group.id).await?;
        tracing::info!(slug = %group.slug, creator = %actor.username, "Group deleted");
        Ok(Outcome::Done(()))
    }

    /// The group `slug`, provided `username` created it.
    async fn load(&self, username: &str, slug: &str) -> Result<Group, DomainError> {
        let creator = user_by_username(&self.repos, username).await?;
        self.repos
            .groups
            .find_by_slug(slug)
            .await?
            .filter(|group| group.creator_id == Some(creator.id))
            .ok_or_else(|| DomainError::not_found("group", format!("{username}/{slug}")))
    }

    /// Field checks plus uniqueness of title and slug, ignoring `current`.
    async fn validate(
        &self,
        content: &GroupContent,
        current: Option<i64>,
    ) -> Result<(), DomainError> {
        let mut errors = content.validate();
        let other = |group: Option<Group>| group.is_some_and(|g| Some(g.id) != current);

        if other(self.repos.groups.find_by_title(&content.title).await?) {
            errors.push("title", "Group with this title already exists.");
        }
        if other(self.repos.groups.find_by_slug(&content.slug).await?) {
            errors.push("slug", "Group with this slug already exists.");
        }
        errors.into_result()
    }
}

fn check_creator(actor: &Actor, group: Group) -> Outcome<Group> {
    if group.creator_id == Some(actor.user_id) {
        Outcome::Done(group)
    } else {
        tracing::warn!(user = %actor.username, slug = %group.slug, "Refused group change by non-creator");
        Outcome::Redirect(Redirect::AllGroups)
    }
}

/// A uniqueness race lost after validation passed.
fn taken(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => {
            let mut errors = FieldErrors::default();
            errors.push("slug", "Group with this title or slug already exists.");
            DomainError::Validation(errors.into_inner())
        }
        other => other.into(),
    }
}
