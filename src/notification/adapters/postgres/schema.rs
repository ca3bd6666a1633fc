//! Diesel schema for notifications.

diesel::table! {
    /// Per-user decision notifications.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient display name.
        #[max_length = 100]
        user_id -> Varchar,
        /// Short heading.
        title -> Text,
        /// Rendered body.
        message -> Text,
        /// `info`, `success` or `warning`.
        #[max_length = 20]
        kind -> Varchar,
        /// Whether the recipient has read it.
        read -> Bool,
        /// Related task.
        task_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
