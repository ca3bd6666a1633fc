//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row shared by queries, inserts and updates of task records.
///
/// `None` fields are written as `NULL` so resolved requests are cleared.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Owner display name.
    pub owner: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Status.
    pub status: String,
    /// Day the task was logged.
    pub created_on: NaiveDate,
    /// Day the task was closed.
    pub completed_on: Option<NaiveDate>,
    /// Current target date.
    pub current_target_date: NaiveDate,
    /// Target date history payload.
    pub target_date_history: Value,
    /// Date change pending flag.
    pub date_change_pending: bool,
    /// Requested target date.
    pub date_change_requested_date: Option<NaiveDate>,
    /// Date change reason.
    pub date_change_reason: Option<String>,
    /// Date change approver.
    pub date_change_approved_by: Option<String>,
    /// Closure pending flag.
    pub closure_pending: bool,
    /// Closure comment.
    pub closure_comment: Option<String>,
    /// Closure requester.
    pub closure_requested_by: Option<String>,
    /// Closure approver.
    pub closure_approved_by: Option<String>,
    /// Closure rejection reason.
    pub closure_rejection_comment: Option<String>,
    /// Parent task identifier.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Waiting-for-subtask flag.
    pub waiting_for_subtask: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
