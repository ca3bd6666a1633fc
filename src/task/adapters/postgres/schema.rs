//! Diesel schema for task persistence.

diesel::table! {
    /// Tasks and subtasks with their pending requests.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        title -> Text,
        /// Owner display name.
        #[max_length = 100]
        owner -> Varchar,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// `open` or `closed`.
        #[max_length = 20]
        status -> Varchar,
        /// Day the task was logged.
        created_on -> Date,
        /// Day the task was closed.
        completed_on -> Nullable<Date>,
        /// Last entry of the target date history.
        current_target_date -> Date,
        /// JSON array of `YYYY-MM-DD` dates, oldest first.
        target_date_history -> Jsonb,
        /// Whether a date change awaits a decision.
        date_change_pending -> Bool,
        /// Requested target date.
        date_change_requested_date -> Nullable<Date>,
        /// Reason given for the date change.
        date_change_reason -> Nullable<Text>,
        /// Approver of the latest date change.
        #[max_length = 100]
        date_change_approved_by -> Nullable<Varchar>,
        /// Whether a closure awaits a decision.
        closure_pending -> Bool,
        /// Closure request comment.
        closure_comment -> Nullable<Text>,
        /// Member who requested closure.
        #[max_length = 100]
        closure_requested_by -> Nullable<Varchar>,
        /// Approver of the closure.
        #[max_length = 100]
        closure_approved_by -> Nullable<Varchar>,
        /// Latest closure rejection reason.
        closure_rejection_comment -> Nullable<Text>,
        /// Parent task for subtasks.
        parent_task_id -> Nullable<Uuid>,
        /// Whether the task waits for open subtasks.
        waiting_for_subtask -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
