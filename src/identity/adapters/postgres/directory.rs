//! `PostgreSQL` implementation of the team roster.

use super::{models::TeamMemberRow, schema::team_members};
use crate::identity::{
    domain::{MemberId, MemberName, PersistedTeamMember, TeamMember},
    ports::{TeamDirectory, TeamDirectoryError, TeamDirectoryResult},
};
use crate::storage::postgres::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

diesel::define_sql_function! {
    /// SQL `lower()` for case-insensitive name matching.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// `PostgreSQL`-backed [`TeamDirectory`].
#[derive(Debug, Clone)]
pub struct PostgresTeamDirectory {
    pool: PgPool,
}

impl PostgresTeamDirectory {
    /// Creates a roster adapter from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamDirectory for PostgresTeamDirectory {
    async fn add(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let row = to_row(member);
        run_blocking(&self.pool, move |connection| {
            if find_row_by_name(connection, &row.name)?.is_some() {
                return Err(TeamDirectoryError::DuplicateName(row.name.clone()));
            }
            diesel::insert_into(team_members::table)
                .values(&row)
                .execute(connection)
                .map_err(TeamDirectoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update(&self, member: &TeamMember) -> TeamDirectoryResult<()> {
        let row = to_row(member);
        let id = member.id();
        run_blocking(&self.pool, move |connection| {
            if let Some(existing) = find_row_by_name(connection, &row.name)? {
                if existing.id != row.id {
                    return Err(TeamDirectoryError::DuplicateName(row.name.clone()));
                }
            }
            let affected = diesel::update(team_members::table.find(row.id))
                .set(&row)
                .execute(connection)
                .map_err(TeamDirectoryError::persistence)?;
            if affected == 0 {
                return Err(TeamDirectoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: MemberId) -> TeamDirectoryResult<()> {
        run_blocking(&self.pool, move |connection| {
            let affected = diesel::delete(team_members::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TeamDirectoryError::persistence)?;
            if affected == 0 {
                return Err(TeamDirectoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: MemberId) -> TeamDirectoryResult<Option<TeamMember>> {
        run_blocking(&self.pool, move |connection| {
            let row = team_members::table
                .find(id.into_inner())
                .select(TeamMemberRow::as_select())
                .first::<TeamMemberRow>(connection)
                .optional()
                .map_err(TeamDirectoryError::persistence)?;
            row.map(row_to_member).transpose()
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> TeamDirectoryResult<Option<TeamMember>> {
        let lookup = name.trim().to_owned();
        run_blocking(&self.pool, move |connection| {
            find_row_by_name(connection, &lookup)?
                .map(row_to_member)
                .transpose()
        })
        .await
    }

    async fn list(&self) -> TeamDirectoryResult<Vec<TeamMember>> {
        run_blocking(&self.pool, move |connection| {
            team_members::table
                .order(lower(team_members::name).asc())
                .select(TeamMemberRow::as_select())
                .load::<TeamMemberRow>(connection)
                .map_err(TeamDirectoryError::persistence)?
                .into_iter()
                .map(row_to_member)
                .collect()
        })
        .await
    }
}

fn find_row_by_name(
    connection: &mut PgConnection,
    name: &str,
) -> TeamDirectoryResult<Option<TeamMemberRow>> {
    team_members::table
        .filter(lower(team_members::name).eq(name.to_lowercase()))
        .select(TeamMemberRow::as_select())
        .first::<TeamMemberRow>(connection)
        .optional()
        .map_err(TeamDirectoryError::persistence)
}

fn to_row(member: &TeamMember) -> TeamMemberRow {
    TeamMemberRow {
        id: member.id().into_inner(),
        name: member.name().as_str().to_owned(),
        is_active: member.is_active(),
        is_hod: member.is_hod(),
        created_at: member.created_at(),
        updated_at: member.updated_at(),
    }
}

fn row_to_member(row: TeamMemberRow) -> TeamDirectoryResult<TeamMember> {
    let name = MemberName::new(row.name).map_err(TeamDirectoryError::persistence)?;
    Ok(TeamMember::from_persisted(PersistedTeamMember {
        id: MemberId::from_uuid(row.id),
        name,
        is_active: row.is_active,
        is_hod: row.is_hod,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
