//! Identity resolution port.

use crate::identity::domain::{Actor, Forbidden, IdentityDomainError};
use crate::identity::ports::TeamDirectoryError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Resolves the actor behind the current session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in actor, or `None` when nobody is signed in.
    async fn current_actor(&self) -> IdentityResult<Option<Actor>>;
}

/// Errors returned by identity providers.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// Name validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// The acting user lacks the required role.
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    /// An account with the same name already exists.
    #[error("an account for '{0}' already exists")]
    AccountExists(String),

    /// Name or password did not match.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// The account has no security answer on file, or it did not match.
    #[error("security answer could not be verified")]
    SecurityAnswerMismatch,

    /// The password is empty.
    #[error("password must not be empty")]
    EmptyPassword,

    /// No account exists with the given identifier.
    #[error("unknown account")]
    UnknownAccount,

    /// The roster lookup failed.
    #[error(transparent)]
    Directory(#[from] TeamDirectoryError),

    /// Session or account state could not be accessed.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    /// The account store could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
