//! Thread-safe in-memory notification store.

use crate::feed::{ChangeFeed, Subscription};
use crate::identity::domain::MemberName;
use crate::notification::{
    adapters::{DEFAULT_RETENTION, enforce_retention, mark_all_read_for, recent_for},
    domain::{Notification, NotificationId},
    ports::{
        NotificationChange, NotificationRepository, NotificationRepositoryError,
        NotificationRepositoryResult,
    },
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory [`NotificationRepository`] for tests and the memory backend.
#[derive(Debug, Clone)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<Vec<Notification>>>,
    retention: usize,
    feed: ChangeFeed<NotificationChange>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty store with the default retention.
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// Creates an empty store keeping `retention` entries per recipient.
    #[must_use]
    pub fn with_retention(retention: usize) -> Self {
        Self {
            notifications: Arc::new(RwLock::new(Vec::new())),
            retention: retention.max(1),
            feed: ChangeFeed::new(),
        }
    }
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(err: impl std::fmt::Display) -> NotificationRepositoryError {
    NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn append(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        {
            let mut notifications = self.notifications.write().map_err(lock_error)?;
            notifications.push(notification.clone());
            enforce_retention(&mut notifications, notification.user_id(), self.retention);
        }
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
        let notifications = self.notifications.read().map_err(lock_error)?;
        Ok(recent_for(notifications.iter(), user, limit))
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        let notifications = self.notifications.read().map_err(lock_error)?;
        Ok(notifications
            .iter()
            .find(|notification| notification.id() == id)
            .cloned())
    }

    async fn count_unread(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        let notifications = self.notifications.read().map_err(lock_error)?;
        Ok(notifications
            .iter()
            .filter(|notification| notification.is_for(user) && !notification.is_read())
            .count())
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let user_id = {
            let mut notifications = self.notifications.write().map_err(lock_error)?;
            let notification = notifications
                .iter_mut()
                .find(|notification| notification.id() == id)
                .ok_or(NotificationRepositoryError::NotFound(id))?;
            notification.mark_read();
            notification.user_id().clone()
        };
        self.feed.publish(NotificationChange::Read { user_id });
        Ok(())
    }

    async fn mark_all_read(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        let changed = {
            let mut notifications = self.notifications.write().map_err(lock_error)?;
            mark_all_read_for(&mut notifications, user)
        };
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
