//! Notification entity.

use super::{NotificationDraft, NotificationId};
use crate::identity::domain::MemberName;
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity used to style a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Neutral information.
    Info,
    /// An approval.
    Success,
    /// A rejection.
    Warning,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            _ => Err(value.to_owned()),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a member's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    user_id: MemberName,
    title: String,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationKind,
    #[serde(default)]
    read: bool,
    #[serde(default)]
    task_id: Option<TaskId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotification {
    /// Persisted identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: MemberName,
    /// Short heading.
    pub title: String,
    /// Rendered body.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Task the notification refers to.
    pub task_id: Option<TaskId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification from a rendered draft.
    #[must_use]
    pub fn new(draft: NotificationDraft, clock: &impl Clock) -> Self {
        Self {
            id: NotificationId::new(),
            user_id: draft.recipient,
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            read: false,
            task_id: draft.task_id,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotification) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            title: data.title,
            message: data.message,
            kind: data.kind,
            read: data.read,
            task_id: data.task_id,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn user_id(&self) -> &MemberName {
        &self.user_id
    }

    /// Returns the heading.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns `true` once read.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Returns the related task.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when addressed to `user`.
    #[must_use]
    pub fn is_for(&self, user: &MemberName) -> bool {
        self.user_id.same_member(user)
    }

    /// Marks the notification read.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }
}
