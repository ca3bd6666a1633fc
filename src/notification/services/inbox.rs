//! Per-user inbox queries and read tracking.

use crate::feed::Subscription;
use crate::identity::domain::Actor;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationChange, NotificationRepository, NotificationRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Notifications returned by [`NotificationService::inbox`] unless
/// configured otherwise.
pub const DEFAULT_INBOX_SIZE: usize = 20;

/// Service-level errors for inbox operations.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),
    /// The notification does not exist.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),
    /// The notification belongs to another member.
    #[error("notification {0} is addressed to another member")]
    NotRecipient(NotificationId),
}

/// Result type for inbox operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Inbox service scoped to the acting member.
pub struct NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    repository: Arc<R>,
    inbox_size: usize,
}

impl<R> Clone for NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            inbox_size: self.inbox_size,
        }
    }
}

impl<R> NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    /// Creates an inbox service with the default inbox size.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            inbox_size: DEFAULT_INBOX_SIZE,
        }
    }

    /// Sets how many notifications [`Self::inbox`] returns.
    #[must_use]
    pub fn with_inbox_size(mut self, inbox_size: usize) -> Self {
        self.inbox_size = inbox_size.max(1);
        self
    }

    /// Returns the actor's most recent notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] on storage failure.
    pub async fn inbox(&self, actor: &Actor) -> NotificationServiceResult<Vec<Notification>> {
        let notifications = self
            .repository
            .find_by_user(actor.display_name(), self.inbox_size)
            .await?;
        debug!(user = %actor.display_name(), count = notifications.len(), "inbox loaded");
        Ok(notifications)
    }

    /// Returns how many of the actor's notifications are unread.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] on storage failure.
    pub async fn unread_count(&self, actor: &Actor) -> NotificationServiceResult<usize> {
        Ok(self.repository.count_unread(actor.display_name()).await?)
    }

    /// Marks one of the actor's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] for an unknown
    /// notification and [`NotificationServiceError::NotRecipient`] when it
    /// belongs to someone else.
    pub async fn mark_read(
        &self,
        actor: &Actor,
        id: NotificationId,
    ) -> NotificationServiceResult<()> {
        let notification = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(NotificationServiceError::NotFound(id))?;
        if !notification.is_for(actor.display_name()) {
            return Err(NotificationServiceError::NotRecipient(id));
        }
        if notification.is_read() {
            return Ok(());
        }
        self.repository.mark_read(id).await?;
        debug!(notification_id = %id, user = %actor.display_name(), "notification read");
        Ok(())
    }

    /// Marks every notification of the actor read and returns how many
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] on storage failure.
    pub async fn mark_all_read(&self, actor: &Actor) -> NotificationServiceResult<usize> {
        let changed = self
            .repository
            .mark_all_read(actor.display_name())
            .await?;
        debug!(user = %actor.display_name(), changed, "inbox marked read");
        Ok(changed)
    }

    /// Subscribes to inbox changes across all members.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<NotificationChange> {
        self.repository.subscribe()
    }
}
