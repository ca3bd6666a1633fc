//! `PostgreSQL` repository implementation for notifications.

use super::{models::NotificationRow, schema::notifications};
use crate::feed::{ChangeFeed, Subscription};
use crate::identity::domain::MemberName;
use crate::notification::{
    adapters::DEFAULT_RETENTION,
    domain::{Notification, NotificationId, NotificationKind, PersistedNotification},
    ports::{
        NotificationChange, NotificationRepository, NotificationRepositoryError,
        NotificationRepositoryResult,
    },
};
use crate::storage::postgres::{PgPool, run_blocking};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

impl From<DieselError> for NotificationRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

diesel::define_sql_function! {
    /// SQL `lower()` for case-insensitive recipient matching.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// `PostgreSQL`-backed [`NotificationRepository`].
///
/// The change feed reports writes made through this instance only.
#[derive(Debug, Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
    retention: usize,
    feed: ChangeFeed<NotificationChange>,
}

impl PostgresNotificationRepository {
    /// Creates a repository with the default retention.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_retention(pool, DEFAULT_RETENTION)
    }

    /// Creates a repository keeping `retention` entries per recipient.
    #[must_use]
    pub fn with_retention(pool: PgPool, retention: usize) -> Self {
        Self {
            pool,
            retention: retention.max(1),
            feed: ChangeFeed::new(),
        }
    }
}

fn row_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn append(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let row = to_row(notification);
        let keep = row_limit(self.retention);
        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, NotificationRepositoryError, _>(|transaction| {
                diesel::insert_into(notifications::table)
                    .values(&row)
                    .execute(transaction)
                    .map_err(NotificationRepositoryError::persistence)?;
                trim_inbox(transaction, &row.user_id, keep)
            })
        })
        .await?;
        self.feed.publish(NotificationChange::Added {
            user_id: notification.user_id().clone(),
            id: notification.id(),
        });
        Ok(())
    }

    async fn find_by_user(
        &self,
        user: &MemberName,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let recipient = user.as_str().to_lowercase();
        let rows = row_limit(limit);
        run_blocking(&self.pool, move |connection| {
            notifications::table
                .filter(lower(notifications::user_id).eq(recipient))
                .order((notifications::created_at.desc(), notifications::id.asc()))
                .limit(rows)
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationRepositoryError::persistence)?
                .into_iter()
                .map(row_to_notification)
                .collect()
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        run_blocking(&self.pool, move |connection| {
            notifications::table
                .find(id.into_inner())
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?
                .map(row_to_notification)
                .transpose()
        })
        .await
    }

    async fn count_unread(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        let recipient = user.as_str().to_lowercase();
        run_blocking(&self.pool, move |connection| {
            let count: i64 = notifications::table
                .filter(lower(notifications::user_id).eq(recipient))
                .filter(notifications::read.eq(false))
                .count()
                .get_result(connection)
                .map_err(NotificationRepositoryError::persistence)?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
        .await
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let recipient = run_blocking(&self.pool, move |connection| {
            diesel::update(notifications::table.find(id.into_inner()))
                .set(notifications::read.eq(true))
                .returning(notifications::user_id)
                .get_result::<String>(connection)
                .optional()
                .map_err(NotificationRepositoryError::persistence)?
                .ok_or(NotificationRepositoryError::NotFound(id))
        })
        .await?;
        let user_id = MemberName::new(recipient).map_err(NotificationRepositoryError::persistence)?;
        self.feed.publish(NotificationChange::Read { user_id });
        Ok(())
    }

    async fn mark_all_read(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        let recipient = user.as_str().to_lowercase();
        let changed = run_blocking(&self.pool, move |connection| {
            diesel::update(
                notifications::table
                    .filter(lower(notifications::user_id).eq(recipient))
                    .filter(notifications::read.eq(false)),
            )
            .set(notifications::read.eq(true))
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)
        })
        .await?;
        if changed > 0 {
            self.feed.publish(NotificationChange::Read {
                user_id: user.clone(),
            });
        }
        Ok(changed)
    }

    fn subscribe(&self) -> Subscription<NotificationChange> {
        self.feed.subscribe()
    }
}

fn trim_inbox(
    connection: &mut PgConnection,
    user_id: &str,
    keep: i64,
) -> NotificationRepositoryResult<()> {
    let recipient = user_id.to_lowercase();
    let kept: Vec<uuid::Uuid> = notifications::table
        .filter(lower(notifications::user_id).eq(&recipient))
        .order((notifications::created_at.desc(), notifications::id.asc()))
        .limit(keep)
        .select(notifications::id)
        .load(connection)
        .map_err(NotificationRepositoryError::persistence)?;
    diesel::delete(
        notifications::table
            .filter(lower(notifications::user_id).eq(&recipient))
            .filter(diesel::dsl::not(notifications::id.eq_any(kept))),
    )
    .execute(connection)
    .map_err(NotificationRepositoryError::persistence)?;
    Ok(())
}

fn to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: notification.id().into_inner(),
        user_id: notification.user_id().as_str().to_owned(),
        title: notification.title().to_owned(),
        message: notification.message().to_owned(),
        kind: notification.kind().as_str().to_owned(),
        read: notification.is_read(),
        task_id: notification.task_id().map(TaskId::into_inner),
        created_at: notification.created_at(),
    }
}

fn row_to_notification(row: NotificationRow) -> NotificationRepositoryResult<Notification> {
    let user_id = MemberName::new(row.user_id).map_err(NotificationRepositoryError::persistence)?;
    let kind = NotificationKind::try_from(row.kind.as_str()).map_err(|kind| {
        NotificationRepositoryError::persistence(std::io::Error::other(format!(
            "unknown notification kind '{kind}'"
        )))
    })?;
    Ok(Notification::from_persisted(PersistedNotification {
        id: NotificationId::from_uuid(row.id),
        user_id,
        title: row.title,
        message: row.message,
        kind,
        read: row.read,
        task_id: row.task_id.map(TaskId::from_uuid),
        created_at: row.created_at,
    }))
}
