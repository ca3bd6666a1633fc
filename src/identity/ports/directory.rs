//! Roster persistence port.

use crate::identity::domain::{MemberId, TeamMember};
use crate::storage::PersistenceFailure;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for roster operations.
pub type TeamDirectoryResult<T> = Result<T, TeamDirectoryError>;

/// Team roster contract.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`TeamDirectoryError::DuplicateName`] when another member
    /// already uses the name (case-insensitively).
    async fn add(&self, member: &TeamMember) -> TeamDirectoryResult<()>;

    /// Persists changes to an existing member.
    ///
    /// # Errors
    ///
    /// Returns [`TeamDirectoryError::NotFound`] when the member does not
    /// exist, or [`TeamDirectoryError::DuplicateName`] when a rename collides.
    async fn update(&self, member: &TeamMember) -> TeamDirectoryResult<()>;

    /// Removes a member.
    ///
    /// # Errors
    ///
    /// Returns [`TeamDirectoryError::NotFound`] when the member does not
    /// exist.
    async fn remove(&self, id: MemberId) -> TeamDirectoryResult<()>;

    /// Finds a member by identifier.
    async fn find_by_id(&self, id: MemberId) -> TeamDirectoryResult<Option<TeamMember>>;

    /// Finds a member by name, ignoring case.
    async fn find_by_name(&self, name: &str) -> TeamDirectoryResult<Option<TeamMember>>;

    /// Returns every member ordered by name.
    async fn list(&self) -> TeamDirectoryResult<Vec<TeamMember>>;
}

/// Errors returned by roster implementations.
#[derive(Debug, Clone, Error)]
pub enum TeamDirectoryError {
    /// A member with the same name already exists.
    #[error("a team member named '{0}' already exists")]
    DuplicateName(String),

    /// The member was not found.
    #[error("team member not found: {0}")]
    NotFound(MemberId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TeamDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceFailure for TeamDirectoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
