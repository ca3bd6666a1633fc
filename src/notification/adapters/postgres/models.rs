//! Diesel row models for notifications.

use super::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row shared by queries and inserts of notifications.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient display name.
    pub user_id: String,
    /// Heading.
    pub title: String,
    /// Body.
    pub message: String,
    /// Severity.
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Related task.
    pub task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
