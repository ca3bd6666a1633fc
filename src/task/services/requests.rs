//! Request payloads accepted by the lifecycle service.

use crate::task::domain::TaskId;

/// Request payload for logging a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(super) title: String,
    pub(super) owner: String,
    pub(super) target_date: String,
    pub(super) notes: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields. `target_date` is
    /// `YYYY-MM-DD`.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        target_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            owner: owner.into(),
            target_date: target_date.into(),
            notes: None,
        }
    }

    /// Sets free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Request payload for splitting a subtask off an open task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubtaskRequest {
    pub(super) parent_id: TaskId,
    pub(super) title: String,
    pub(super) owner: String,
    pub(super) target_date: String,
}

impl AddSubtaskRequest {
    /// Creates a request. `target_date` is `YYYY-MM-DD`.
    #[must_use]
    pub fn new(
        parent_id: TaskId,
        title: impl Into<String>,
        owner: impl Into<String>,
        target_date: impl Into<String>,
    ) -> Self {
        Self {
            parent_id,
            title: title.into(),
            owner: owner.into(),
            target_date: target_date.into(),
        }
    }
}

/// Request payload for editing a task's title or notes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateTaskDetailsRequest {
    pub(super) title: Option<String>,
    pub(super) notes: Option<String>,
}

impl UpdateTaskDetailsRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the notes. An empty string clears them.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
