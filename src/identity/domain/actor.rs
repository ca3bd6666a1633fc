//! The acting user and the central role guard.

use super::{MemberName, Role, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by [`Actor::require_role`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{actor} does not hold the {required} role")]
pub struct Forbidden {
    /// Actor that attempted the operation.
    pub actor: MemberName,
    /// Role the operation requires.
    pub required: Role,
}

/// The user performing an operation, resolved per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    display_name: MemberName,
    role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, display_name: MemberName, role: Role) -> Self {
        Self {
            id,
            display_name,
            role,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name used for ownership checks.
    #[must_use]
    pub const fn display_name(&self) -> &MemberName {
        &self.display_name
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for Heads of Department.
    #[must_use]
    pub const fn is_hod(&self) -> bool {
        matches!(self.role, Role::Hod)
    }

    /// Returns `true` when the actor is the named member.
    #[must_use]
    pub fn is(&self, member: &MemberName) -> bool {
        self.display_name.same_member(member)
    }

    /// Fails unless the actor holds `required`.
    ///
    /// # Errors
    ///
    /// Returns [`Forbidden`] when the actor's role differs.
    pub fn require_role(&self, required: Role) -> Result<(), Forbidden> {
        if self.role == required {
            return Ok(());
        }
        Err(Forbidden {
            actor: self.display_name.clone(),
            required,
        })
    }
}
