//! Error types for identity domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The member name is empty after trimming.
    #[error("member name must not be empty")]
    EmptyName,

    /// The member name exceeds the storage limit.
    #[error("member name '{0}' is longer than 100 characters")]
    NameTooLong(String),
}

/// Error returned while parsing roles from persistence or configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
