//! Diesel row models for the team roster.

use super::schema::team_members;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row shared by queries, inserts and updates of roster entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamMemberRow {
    /// Member identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Active flag.
    pub is_active: bool,
    /// Head of Department flag.
    pub is_hod: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
