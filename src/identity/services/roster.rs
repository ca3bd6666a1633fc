//! HOD-only roster management.

use crate::identity::{
    domain::{Actor, Forbidden, IdentityDomainError, MemberId, MemberName, Role, TeamMember},
    ports::{TeamDirectory, TeamDirectoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors returned by roster management.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The acting user is not a Head of Department.
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    /// Name validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),
    /// Roster persistence failed.
    #[error(transparent)]
    Directory(#[from] TeamDirectoryError),
}

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Roster management service.
pub struct TeamRosterService<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<D, C> Clone for TeamRosterService<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<D, C> TeamRosterService<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a roster service.
    #[must_use]
    pub const fn new(directory: Arc<D>, clock: Arc<C>) -> Self {
        Self { directory, clock }
    }

    /// Adds a member to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Forbidden`] for non-HOD actors, or a validation
    /// or directory error.
    pub async fn add_member(
        &self,
        actor: &Actor,
        name: &str,
        is_hod: bool,
    ) -> RosterResult<TeamMember> {
        actor.require_role(Role::Hod)?;
        let member = TeamMember::new(MemberName::new(name)?, is_hod, &*self.clock);
        self.directory.add(&member).await?;
        info!(member = %member.name(), is_hod, by = %actor.display_name(), "team member added");
        Ok(member)
    }

    /// Renames a member.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Forbidden`] for non-HOD actors, or a validation
    /// or directory error.
    pub async fn rename_member(
        &self,
        actor: &Actor,
        id: MemberId,
        name: &str,
    ) -> RosterResult<TeamMember> {
        actor.require_role(Role::Hod)?;
        let new_name = MemberName::new(name)?;
        self.modify(id, |member, clock| member.rename(new_name, clock))
            .await
    }

    /// Activates or deactivates a member.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Forbidden`] for non-HOD actors, or a directory
    /// error.
    pub async fn set_active(
        &self,
        actor: &Actor,
        id: MemberId,
        is_active: bool,
    ) -> RosterResult<TeamMember> {
        actor.require_role(Role::Hod)?;
        self.modify(id, |member, clock| member.set_active(is_active, clock))
            .await
    }

    /// Grants or revokes the Head of Department flag.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Forbidden`] for non-HOD actors, or a directory
    /// error.
    pub async fn set_hod(&self, actor: &Actor, id: MemberId, is_hod: bool) -> RosterResult<TeamMember> {
        actor.require_role(Role::Hod)?;
        self.modify(id, |member, clock| member.set_hod(is_hod, clock))
            .await
    }

    /// Removes a member from the roster. Existing tasks keep their owner.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Forbidden`] for non-HOD actors, or a directory
    /// error.
    pub async fn remove_member(&self, actor: &Actor, id: MemberId) -> RosterResult<()> {
        actor.require_role(Role::Hod)?;
        self.directory.remove(id).await?;
        info!(member_id = %id, by = %actor.display_name(), "team member removed");
        Ok(())
    }

    /// Lists the whole roster ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Directory`] when the lookup fails.
    pub async fn members(&self) -> RosterResult<Vec<TeamMember>> {
        Ok(self.directory.list().await?)
    }

    /// Lists members that can own tasks: active and not HOD.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Directory`] when the lookup fails.
    pub async fn assignable_members(&self) -> RosterResult<Vec<TeamMember>> {
        let mut members = self.directory.list().await?;
        members.retain(TeamMember::is_assignable);
        Ok(members)
    }

    /// Seeds an empty roster. Does nothing when members already exist.
    ///
    /// Returns the number of members added.
    ///
    /// # Errors
    ///
    /// Returns a validation or directory error.
    pub async fn seed_if_empty(
        &self,
        seed: impl IntoIterator<Item = (String, bool)>,
    ) -> RosterResult<usize> {
        if !self.directory.list().await?.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for (name, is_hod) in seed {
            let member = TeamMember::new(MemberName::new(name)?, is_hod, &*self.clock);
            self.directory.add(&member).await?;
            added += 1;
        }
        info!(added, "seeded team roster");
        Ok(added)
    }

    async fn modify<F>(&self, id: MemberId, change: F) -> RosterResult<TeamMember>
    where
        F: FnOnce(&mut TeamMember, &C) + Send,
    {
        let mut member = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or(TeamDirectoryError::NotFound(id))?;
        change(&mut member, &*self.clock);
        self.directory.update(&member).await?;
        info!(member = %member.name(), "team member updated");
        Ok(member)
    }
}
