//! Validated team member name.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a member name, matching the `VARCHAR(100)` columns.
const MAX_NAME_LENGTH: usize = 100;

/// Display name of a team member.
///
/// Names identify task owners, approvers and notification recipients. The
/// stored spelling is preserved; comparisons against user input go through
/// [`MemberName::matches`], which ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberName(String);

impl MemberName {
    /// Creates a validated member name. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyName`] when the value is empty
    /// after trimming, or [`IdentityDomainError::NameTooLong`] when it exceeds
    /// 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityDomainError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(IdentityDomainError::NameTooLong(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against raw input.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }

    /// Returns `true` when both names refer to the same member.
    #[must_use]
    pub fn same_member(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl TryFrom<String> for MemberName {
    type Error = IdentityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberName> for String {
    fn from(value: MemberName) -> Self {
        value.0
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
