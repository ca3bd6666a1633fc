//! Flat task record shared by the document and SQL adapters.

use crate::identity::domain::MemberName;
use crate::task::domain::{
    ClosureRequest, DateChangeRequest, PersistedTaskData, TargetDateHistory, Task,
    TaskDomainError, TaskId, TaskStatus, TaskTitle,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Storage layout of a task: one field per column, dates as `YYYY-MM-DD`.
///
/// The pending flags and `current_target_date` are derived on write and
/// only cross-checked on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TaskRecord {
    pub(crate) id: TaskId,
    pub(crate) title: TaskTitle,
    pub(crate) owner: MemberName,
    #[serde(default)]
    pub(crate) notes: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) created_on: NaiveDate,
    #[serde(default)]
    pub(crate) completed_on: Option<NaiveDate>,
    pub(crate) current_target_date: NaiveDate,
    pub(crate) target_date_history: TargetDateHistory,
    #[serde(default)]
    pub(crate) date_change_pending: bool,
    #[serde(default)]
    pub(crate) date_change_requested_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) date_change_reason: Option<String>,
    #[serde(default)]
    pub(crate) date_change_approved_by: Option<MemberName>,
    #[serde(default)]
    pub(crate) closure_pending: bool,
    #[serde(default)]
    pub(crate) closure_comment: Option<String>,
    #[serde(default)]
    pub(crate) closure_requested_by: Option<MemberName>,
    #[serde(default)]
    pub(crate) closure_approved_by: Option<MemberName>,
    #[serde(default)]
    pub(crate) closure_rejection_comment: Option<String>,
    #[serde(default)]
    pub(crate) parent_task_id: Option<TaskId>,
    #[serde(default)]
    pub(crate) waiting_for_subtask: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        let date_change = task.date_change_request();
        let closure = task.closure_request();
        Self {
            id: task.id(),
            title: task.title().clone(),
            owner: task.owner().clone(),
            notes: task.notes().map(str::to_owned),
            status: task.status(),
            created_on: task.created_on(),
            completed_on: task.completed_on(),
            current_target_date: task.current_target_date(),
            target_date_history: task.target_date_history().clone(),
            date_change_pending: date_change.is_some(),
            date_change_requested_date: date_change.map(DateChangeRequest::requested_date),
            date_change_reason: date_change.map(|request| request.reason().to_owned()),
            date_change_approved_by: task.date_change_approved_by().cloned(),
            closure_pending: closure.is_some(),
            closure_comment: closure.map(|request| request.comment().to_owned()),
            closure_requested_by: closure.map(|request| request.requested_by().clone()),
            closure_approved_by: task.closure_approved_by().cloned(),
            closure_rejection_comment: task.closure_rejection_comment().map(str::to_owned),
            parent_task_id: task.parent_id(),
            waiting_for_subtask: task.is_waiting_for_subtask(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

fn inconsistent(id: TaskId, detail: &str) -> TaskDomainError {
    TaskDomainError::InconsistentRecord(format!("task {id}: {detail}"))
}

impl TaskRecord {
    /// Rebuilds the aggregate, rejecting records that break task invariants.
    pub(crate) fn into_task(self) -> Result<Task, TaskDomainError> {
        let id = self.id;
        if self.current_target_date != self.target_date_history.current() {
            return Err(inconsistent(
                id,
                "current target date differs from the last history entry",
            ));
        }
        let date_change = if self.date_change_pending {
            let requested_date = self
                .date_change_requested_date
                .ok_or_else(|| inconsistent(id, "pending date change without a date"))?;
            Some(DateChangeRequest::new(
                requested_date,
                self.date_change_reason.unwrap_or_default(),
            ))
        } else {
            None
        };
        let closure = if self.closure_pending {
            let requested_by = self
                .closure_requested_by
                .ok_or_else(|| inconsistent(id, "pending closure without a requester"))?;
            Some(ClosureRequest::new(
                self.closure_comment.unwrap_or_default(),
                requested_by,
            ))
        } else {
            None
        };
        Task::from_persisted(PersistedTaskData {
            id,
            title: self.title,
            owner: self.owner,
            notes: self.notes,
            status: self.status,
            created_on: self.created_on,
            completed_on: self.completed_on,
            target_dates: self.target_date_history,
            date_change,
            date_change_approved_by: self.date_change_approved_by,
            closure,
            closure_approved_by: self.closure_approved_by,
            closure_rejection_comment: self.closure_rejection_comment,
            parent_id: self.parent_task_id,
            waiting_for_subtask: self.waiting_for_subtask,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
