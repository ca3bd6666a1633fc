//! Notification persistence port.

use crate::feed::Subscription;
use crate::identity::domain::MemberName;
use crate::notification::domain::{Notification, NotificationId};
use crate::storage::PersistenceFailure;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Change announced by a notification store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChange {
    /// A notification was added for the recipient.
    Added {
        /// Recipient.
        user_id: MemberName,
        /// New notification.
        id: NotificationId,
    },
    /// One or more notifications of the recipient were marked read.
    Read {
        /// Recipient.
        user_id: MemberName,
    },
    /// The store was modified outside this process.
    Reloaded,
}

/// Notification persistence contract.
///
/// Each recipient keeps at most the store's retention limit; appending
/// beyond it discards that recipient's oldest entries.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a new notification and applies the retention limit.
    async fn append(&self, notification: &Notification) -> NotificationRepositoryResult<()>;

    /// Returns up to `limit` notifications for `user`, most recent first.
    async fn find_by_user(
        &self,
        user: &MemberName,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>>;

    /// Finds a notification by identifier.
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>>;

    /// Returns how many notifications of `user` are unread.
    async fn count_unread(&self, user: &MemberName) -> NotificationRepositoryResult<usize>;

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when it does not
    /// exist.
    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()>;

    /// Marks every notification of `user` read and returns how many changed.
    async fn mark_all_read(&self, user: &MemberName) -> NotificationRepositoryResult<usize>;

    /// Subscribes to store changes.
    fn subscribe(&self) -> Subscription<NotificationChange>;
}

/// Errors returned by notification repositories.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceFailure for NotificationRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
