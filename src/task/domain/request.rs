//! Requests awaiting a Head of Department decision.

use crate::identity::domain::MemberName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of request an owner can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Request to move the target date.
    DateChange,
    /// Request to close the task.
    Closure,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DateChange => "date change",
            Self::Closure => "closure",
        })
    }
}

/// Pending request to move a task's target date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChangeRequest {
    requested_date: NaiveDate,
    reason: String,
}

impl DateChangeRequest {
    /// Creates a request. Callers validate the reason.
    #[must_use]
    pub const fn new(requested_date: NaiveDate, reason: String) -> Self {
        Self {
            requested_date,
            reason,
        }
    }

    /// Returns the proposed target date.
    #[must_use]
    pub const fn requested_date(&self) -> NaiveDate {
        self.requested_date
    }

    /// Returns the owner's justification.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Pending request to close a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureRequest {
    comment: String,
    requested_by: MemberName,
}

impl ClosureRequest {
    /// Creates a request. Callers validate the comment.
    #[must_use]
    pub const fn new(comment: String, requested_by: MemberName) -> Self {
        Self {
            comment,
            requested_by,
        }
    }

    /// Returns the closure comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns who raised the request.
    #[must_use]
    pub const fn requested_by(&self) -> &MemberName {
        &self.requested_by
    }
}
