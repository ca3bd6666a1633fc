//! Error types for task domain validation and lifecycle guards.

use super::{RequestKind, TaskId};
use crate::identity::domain::{Forbidden, MemberName};
use thiserror::Error;

/// Errors returned by task construction and lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The acting user lacks the role the transition requires.
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    /// Only the task owner may perform the operation.
    #[error("{actor} does not own task {task_id} (owner: {owner})")]
    NotOwner {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Acting user.
        actor: MemberName,
        /// Current task owner.
        owner: MemberName,
    },

    /// No request of the given kind awaits a decision.
    #[error("no {kind} request is pending on task {task_id}")]
    NotPending {
        /// Task the decision targeted.
        task_id: TaskId,
        /// Request kind that was expected.
        kind: RequestKind,
    },

    /// A request of the given kind already awaits a decision.
    #[error("a {kind} request is already pending on task {task_id}")]
    AlreadyPending {
        /// Task the request targeted.
        task_id: TaskId,
        /// Request kind already in flight.
        kind: RequestKind,
    },

    /// The task is waiting for at least one open subtask.
    #[error("task {0} is waiting for its subtasks to close")]
    Blocked(TaskId),

    /// Subtasks group one level deep; a subtask cannot have its own.
    #[error("task {0} is already a subtask")]
    NestedSubtask(TaskId),

    /// The task is already closed.
    #[error("task {0} is closed")]
    TaskClosed(TaskId),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A date-change request carried no reason.
    #[error("a reason is required for a date change request")]
    EmptyReason,

    /// A closure request or rejection carried no comment.
    #[error("a comment is required")]
    EmptyComment,

    /// The value is not a `YYYY-MM-DD` calendar date.
    #[error("invalid calendar date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The owner is not an active, non-HOD roster member.
    #[error("{0} cannot be assigned tasks")]
    OwnerNotAssignable(String),

    /// A stored record violates a task invariant.
    #[error("inconsistent task record: {0}")]
    InconsistentRecord(String),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
