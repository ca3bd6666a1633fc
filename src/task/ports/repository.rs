//! Repository port for task persistence and change notification.

use crate::feed::Subscription;
use crate::storage::PersistenceFailure;
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// One write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWrite {
    /// Stores a new task.
    Insert(Task),
    /// Replaces an existing task.
    Update(Task),
    /// Removes a task.
    Delete(TaskId),
}

impl TaskWrite {
    /// Returns the identifier of the task the write touches.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Insert(task) | Self::Update(task) => task.id(),
            Self::Delete(id) => *id,
        }
    }
}

/// Change announced to subscribers after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskChange {
    /// A task was stored.
    Inserted(TaskId),
    /// A task was updated.
    Updated(TaskId),
    /// A task was removed.
    Deleted(TaskId),
    /// The backing store changed outside this process; re-read everything.
    Reloaded,
}

impl From<&TaskWrite> for TaskChange {
    fn from(write: &TaskWrite) -> Self {
        match write {
            TaskWrite::Insert(task) => Self::Inserted(task.id()),
            TaskWrite::Update(task) => Self::Updated(task.id()),
            TaskWrite::Delete(id) => Self::Deleted(*id),
        }
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task, newest first.
    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the subtasks of `parent`, oldest first.
    async fn find_children(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies every write or none of them.
    ///
    /// Concurrent readers observe either the state before the batch or the
    /// state after it.
    ///
    /// # Errors
    ///
    /// Returns the first failing write's error; nothing is persisted.
    async fn apply_atomic(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()>;

    /// Subscribes to changes made through this repository.
    fn subscribe(&self) -> Subscription<TaskChange>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceFailure for TaskRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
