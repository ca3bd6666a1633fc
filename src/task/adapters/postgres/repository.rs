//! `PostgreSQL` repository implementation for task storage.

use super::{models::TaskRow, schema::tasks};
use crate::feed::{ChangeFeed, Subscription};
use crate::identity::domain::MemberName;
use crate::storage::postgres::{PgPool, run_blocking};
use crate::task::{
    adapters::TaskRecord,
    domain::{TargetDateHistory, Task, TaskId, TaskStatus, TaskTitle},
    ports::{TaskChange, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed [`TaskRepository`].
///
/// Batches run in one transaction. The change feed reports writes made
/// through this instance only.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
    feed: ChangeFeed<TaskChange>,
}

impl PostgresTaskRepository {
    /// Creates a repository from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            feed: ChangeFeed::new(),
        }
    }

    async fn write_batch(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()> {
        let rows = writes
            .iter()
            .map(|write| match write {
                TaskWrite::Insert(task) => to_row(task).map(RowWrite::Insert),
                TaskWrite::Update(task) => to_row(task).map(RowWrite::Update),
                TaskWrite::Delete(id) => Ok(RowWrite::Delete(*id)),
            })
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|transaction| {
                rows.iter()
                    .try_for_each(|row| execute_write(transaction, row))
            })
        })
        .await?;
        for write in writes {
            self.feed.publish(TaskChange::from(write));
        }
        Ok(())
    }
}

enum RowWrite {
    Insert(TaskRow),
    Update(TaskRow),
    Delete(TaskId),
}

fn execute_write(connection: &mut PgConnection, write: &RowWrite) -> TaskRepositoryResult<()> {
    match write {
        RowWrite::Insert(row) => {
            diesel::insert_into(tasks::table)
                .values(row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(TaskId::from_uuid(row.id))
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
        }
        RowWrite::Update(row) => {
            let affected = diesel::update(tasks::table.find(row.id))
                .set(row)
                .execute(connection)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(TaskId::from_uuid(row.id)));
            }
        }
        RowWrite::Delete(id) => {
            let affected = diesel::delete(tasks::table.find(id.into_inner())).execute(connection)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(*id));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Insert(task.clone())]).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Update(task.clone())]).await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Delete(id)]).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        run_blocking(&self.pool, move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(&self.pool, move |connection| {
            tasks::table
                .order((tasks::created_at.desc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn find_children(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(&self.pool, move |connection| {
            tasks::table
                .filter(tasks::parent_task_id.eq(parent.into_inner()))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn apply_atomic(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()> {
        self.write_batch(writes).await
    }

    fn subscribe(&self) -> Subscription<TaskChange> {
        self.feed.subscribe()
    }
}

fn to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let record = TaskRecord::from(task);
    let target_date_history = serde_json::to_value(&record.target_date_history)
        .map_err(TaskRepositoryError::persistence)?;
    Ok(TaskRow {
        id: record.id.into_inner(),
        title: record.title.into(),
        owner: record.owner.into(),
        notes: record.notes,
        status: record.status.as_str().to_owned(),
        created_on: record.created_on,
        completed_on: record.completed_on,
        current_target_date: record.current_target_date,
        target_date_history,
        date_change_pending: record.date_change_pending,
        date_change_requested_date: record.date_change_requested_date,
        date_change_reason: record.date_change_reason,
        date_change_approved_by: record.date_change_approved_by.map(String::from),
        closure_pending: record.closure_pending,
        closure_comment: record.closure_comment,
        closure_requested_by: record.closure_requested_by.map(String::from),
        closure_approved_by: record.closure_approved_by.map(String::from),
        closure_rejection_comment: record.closure_rejection_comment,
        parent_task_id: record.parent_task_id.map(TaskId::into_inner),
        waiting_for_subtask: record.waiting_for_subtask,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

fn member_name(value: Option<String>) -> TaskRepositoryResult<Option<MemberName>> {
    value
        .map(MemberName::new)
        .transpose()
        .map_err(TaskRepositoryError::persistence)
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let record = TaskRecord {
        id: TaskId::from_uuid(row.id),
        title: TaskTitle::new(row.title).map_err(TaskRepositoryError::persistence)?,
        owner: MemberName::new(row.owner).map_err(TaskRepositoryError::persistence)?,
        notes: row.notes,
        status: TaskStatus::try_from(row.status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        created_on: row.created_on,
        completed_on: row.completed_on,
        current_target_date: row.current_target_date,
        target_date_history: serde_json::from_value::<TargetDateHistory>(row.target_date_history)
            .map_err(TaskRepositoryError::persistence)?,
        date_change_pending: row.date_change_pending,
        date_change_requested_date: row.date_change_requested_date,
        date_change_reason: row.date_change_reason,
        date_change_approved_by: member_name(row.date_change_approved_by)?,
        closure_pending: row.closure_pending,
        closure_comment: row.closure_comment,
        closure_requested_by: member_name(row.closure_requested_by)?,
        closure_approved_by: member_name(row.closure_approved_by)?,
        closure_rejection_comment: row.closure_rejection_comment,
        parent_task_id: row.parent_task_id.map(TaskId::from_uuid),
        waiting_for_subtask: row.waiting_for_subtask,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    record.into_task().map_err(TaskRepositoryError::persistence)
}
