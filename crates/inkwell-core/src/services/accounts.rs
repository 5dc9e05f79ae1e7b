//! Account-level commands: profile settings and account removal.

use crate::domain::{Profile, ProfileChanges};
use crate::error::DomainError;
use crate::outcome::{Outcome, Redirect};
use crate::ports::Repositories;

use super::{Actor, user_by_username};

#[derive(Clone)]
pub struct AccountCommands {
    repos: Repositories,
}

impl AccountCommands {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// The actor's profile, created empty on first access.
    pub async fn settings(&self, actor: &Actor) -> Result<Profile, DomainError> {
        Ok(self.repos.profiles.get_or_create(actor.user_id).await?)
    }

    pub async fn update_settings(
        &self,
        actor: &Actor,
        changes: ProfileChanges,
    ) -> Result<Profile, DomainError> {
        changes.validate().into_result()?;

        let mut profile = self.settings(actor).await?;
        profile.bio = changes.bio;
        profile.image = changes.image;
        let profile = self.repos.profiles.update(profile).await?;

        tracing::info!(user = %actor.username, "Profile updated");
        Ok(profile)
    }

    /// Delete the account `username`. Users may only delete themselves;
    /// anyone else is sent back to their own profile.
    pub async fn delete_user(
        &self,
        actor: &Actor,
        username: &str,
    ) -> Result<Outcome<()>, DomainError> {
        let user = user_by_username(&self.repos, username).await?;
        if !actor.is(user.id) {
            tracing::warn!(user = %actor.username, target = %username, "Refused account deletion");
            return Ok(Outcome::Redirect(Redirect::profile(actor.username.clone())));
        }

        self.repos.users.delete(user.id).await?;
        tracing::info!(user = %username, "Account deleted");
        Ok(Outcome::Done(()))
    }
}
