//! Domain model for actors, roles and team members.

mod actor;
mod error;
mod ids;
mod member;
mod name;
mod role;

pub use actor::{Actor, Forbidden};
pub use error::{IdentityDomainError, ParseRoleError};
pub use ids::{MemberId, UserId};
pub use member::{PersistedTeamMember, TeamMember};
pub use name::MemberName;
pub use role::Role;
