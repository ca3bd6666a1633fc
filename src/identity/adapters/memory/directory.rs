//! Thread-safe in-memory team roster.

use crate::identity::{
    adapters::{name_taken, sort_by_name},
    domain::{MemberId, TeamMember},
    ports::{TeamDirectory, TeamDirectoryError, TeamDirectoryResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory [`TeamDirectory`] for tests and the memory backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTeamDirectory {
    members: Arc<RwLock<HashMap<MemberId, TeamMember>>>,
}

impl InMemoryTeamDirectory {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a roster pre-populated with `members`.
    #[must_use]
    pub fn with_members(members: impl IntoIterator<Item = TeamMember>) -> Self {
        let by_id = members
            .into_iter()
            .map(|member| (member.id(), member))
            .collect();
        Self {
            members: Arc::new(RwLock::new(by_id)),
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> TeamDirectoryError {
    TeamDirectoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TeamDirectory for InMemoryTeamDirectory {
    async fn add(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let mut members = self.members.write().map_err(lock_error)?;
        if name_taken(members.values(), member.name().as_str(), None) {
            return Err(TeamDirectoryError::DuplicateName(
                member.name().as_str().to_owned(),
            ));
        }
        members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn update(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let mut members = self.members.write().map_err(lock_error)?;
        if !members.contains_key(&member.id()) {
            return Err(TeamDirectoryError::NotFound(member.id()));
        }
        if name_taken(members.values(), member.name().as_str(), Some(member.id())) {
            return Err(TeamDirectoryError::DuplicateName(
                member.name().as_str().to_owned(),
            ));
        }
        members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn remove(&self, id: MemberId) -> TeamDirectoryResult<()> {
        let mut members = self.members.write().map_err(lock_error)?;
        members
            .remove(&id)
            .map(|_| ())
            .ok_or(TeamDirectoryError::NotFound(id))
    }

    async fn find_by_id(&self, id: MemberId) -> TeamDirectoryResult<Option<TeamMember>> {
        let members = self.members.read().map_err(lock_error)?;
        Ok(members.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> TeamDirectoryResult<Option<TeamMember>> {
        let members = self.members.read().map_err(lock_error)?;
        Ok(members
            .values()
            .find(|member| member.name().matches(name))
            .cloned())
    }

    async fn list(&self) -> TeamDirectoryResult<Vec<TeamMember>> {
        let members = self.members.read().map_err(lock_error)?;
        let mut listed: Vec<TeamMember> = members.values().cloned().collect();
        sort_by_name(&mut listed);
        Ok(listed)
    }
}
