//! Port contracts for identity resolution and the team roster.

pub mod directory;
pub mod provider;

pub use directory::{TeamDirectory, TeamDirectoryError, TeamDirectoryResult};
pub use provider::{IdentityError, IdentityProvider, IdentityResult};
