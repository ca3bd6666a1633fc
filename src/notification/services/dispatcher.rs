//! Adapter from task decisions to stored notifications.

use crate::notification::{
    domain::{Notification, compose},
    ports::NotificationRepository,
};
use crate::task::{
    domain::Decision,
    ports::{DecisionNotifier, DecisionNotifierError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// [`DecisionNotifier`] that renders the owner message and appends it to a
/// [`NotificationRepository`].
pub struct NotificationDispatcher<R, C>
where
    R: NotificationRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for NotificationDispatcher<R, C>
where
    R: NotificationRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> NotificationDispatcher<R, C>
where
    R: NotificationRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher writing to `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }
}

#[async_trait]
impl<R, C> DecisionNotifier for NotificationDispatcher<R, C>
where
    R: NotificationRepository + ?Sized,
    C: Clock + Send + Sync,
{
    async fn notify(&self, decision: &Decision) -> Result<(), DecisionNotifierError> {
        let draft = compose(decision).map_err(DecisionNotifierError::new)?;
        let notification = Notification::new(draft, &*self.clock);
        self.repository
            .append(&notification)
            .await
            .map_err(DecisionNotifierError::new)?;
        info!(
            notification_id = %notification.id(),
            user = %notification.user_id(),
            kind = %notification.kind(),
            "notification sent"
        );
        Ok(())
    }
}
