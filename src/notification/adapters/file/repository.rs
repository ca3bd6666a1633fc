//! Notifications persisted as a single JSON document.

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
use crate::storage::{JsonFile, JsonFileError, WatchHandle, watch_file};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Document file holding every inbox.
const NOTIFICATIONS_FILE: &str = "notifications.json";

/// [`NotificationRepository`] stored in `notifications.json`.
#[derive(Debug)]
pub struct FileNotificationRepository {
    file: Arc<JsonFile<Vec<Notification>>>,
    write_lock: Mutex<()>,
    retention: usize,
    feed: ChangeFeed<NotificationChange>,
}

impl FileNotificationRepository {
    /// Opens the document inside `data_dir` with the default retention.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the directory cannot be opened.
    pub fn open(data_dir: &str) -> Result<Self, JsonFileError> {
        Self::open_with_retention(data_dir, DEFAULT_RETENTION)
    }

    /// Opens the document keeping `retention` entries per recipient.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the directory cannot be opened.
    pub fn open_with_retention(data_dir: &str, retention: usize) -> Result<Self, JsonFileError> {
        Ok(Self {
            file: Arc::new(JsonFile::open(data_dir, NOTIFICATIONS_FILE)?),
            write_lock: Mutex::new(()),
            retention: retention.max(1),
            feed: ChangeFeed::new(),
        })
    }

    /// Announces [`NotificationChange::Reloaded`] whenever the document
    /// changes on disk.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the handle stops the watcher"]
    pub fn watch_external_changes(&self, interval: Duration) -> WatchHandle {
        let feed = self.feed.clone();
        watch_file(Arc::clone(&self.file), interval, move || {
            feed.publish(NotificationChange::Reloaded);
        })
    }

    fn load(&self) -> NotificationRepositoryResult<Vec<Notification>> {
        self.file
            .load()
            .map_err(NotificationRepositoryError::persistence)
    }

    fn save(&self, notifications: &Vec<Notification>) -> NotificationRepositoryResult<()> {
        self.file
            .save(notifications)
            .map_err(NotificationRepositoryError::persistence)
    }
}

#[async_trait]
impl NotificationRepository for FileNotificationRepository {
    async fn append(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        {
            let _guard = self.write_lock.lock().await;
            let mut notifications = self.load()?;
            notifications.push(notification.clone());
            let expired =
                enforce_retention(&mut notifications, notification.user_id(), self.retention);
            if expired > 0 {
                debug!(user = %notification.user_id(), expired, "trimmed inbox");
            }
            self.save(&notifications)?;
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
        Ok(recent_for(self.load()?.iter(), user, limit))
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|notification| notification.id() == id))
    }

    async fn count_unread(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        Ok(self
            .load()?
            .iter()
            .filter(|notification| notification.is_for(user) && !notification.is_read())
            .count())
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let user_id = {
            let _guard = self.write_lock.lock().await;
            let mut notifications = self.load()?;
            let notification = notifications
                .iter_mut()
                .find(|notification| notification.id() == id)
                .ok_or(NotificationRepositoryError::NotFound(id))?;
            notification.mark_read();
            let recipient = notification.user_id().clone();
            self.save(&notifications)?;
            recipient
        };
        self.feed.publish(NotificationChange::Read { user_id });
        Ok(())
    }

    async fn mark_all_read(&self, user: &MemberName) -> NotificationRepositoryResult<usize> {
        let changed = {
            let _guard = self.write_lock.lock().await;
            let mut notifications = self.load()?;
            let updated = mark_all_read_for(&mut notifications, user);
            if updated > 0 {
                self.save(&notifications)?;
            }
            updated
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
