//! Team roster entry.

use super::{MemberId, MemberName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A member of the team roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    id: MemberId,
    name: MemberName,
    is_active: bool,
    is_hod: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTeamMember {
    /// Persisted member identifier.
    pub id: MemberId,
    /// Persisted display name.
    pub name: MemberName,
    /// Whether the member can be assigned new tasks.
    pub is_active: bool,
    /// Whether the member is a Head of Department.
    pub is_hod: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    /// Creates an active roster entry.
    #[must_use]
    pub fn new(name: MemberName, is_hod: bool, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: MemberId::new(),
            name,
            is_active: true,
            is_hod,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a roster entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTeamMember) -> Self {
        Self {
            id: data.id,
            name: data.name,
            is_active: data.is_active,
            is_hod: data.is_hod,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &MemberName {
        &self.name
    }

    /// Returns whether the member is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the member is a Head of Department.
    #[must_use]
    pub const fn is_hod(&self) -> bool {
        self.is_hod
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when tasks may be assigned to this member: active and
    /// not a Head of Department.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        self.is_active && !self.is_hod
    }

    /// Renames the member.
    pub fn rename(&mut self, name: MemberName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Activates or deactivates the member.
    pub fn set_active(&mut self, is_active: bool, clock: &impl Clock) {
        self.is_active = is_active;
        self.touch(clock);
    }

    /// Grants or revokes the Head of Department flag.
    pub fn set_hod(&mut self, is_hod: bool, clock: &impl Clock) {
        self.is_hod = is_hod;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
