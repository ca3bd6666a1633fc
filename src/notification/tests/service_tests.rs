//! Unit tests for the dispatcher and inbox service.

use std::sync::Arc;

use crate::feed::Subscription;
use crate::identity::domain::MemberName;
use crate::notification::{
    adapters::memory::InMemoryNotificationRepository,
    domain::{Notification, NotificationId, NotificationKind},
    ports::{NotificationChange, NotificationRepository, NotificationRepositoryError},
    services::{NotificationDispatcher, NotificationService, NotificationServiceError},
};
use crate::task::{
    domain::{Decision, DecisionOutcome, TaskId, TaskTitle},
    ports::DecisionNotifier,
};
use crate::test_support::{FixedClock, member, name};
use async_trait::async_trait;
use mockable::Clock;
use mockall::mock;
use rstest::{fixture, rstest};

mock! {
    Store {}

    #[async_trait]
    impl NotificationRepository for Store {
        async fn append(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;
        async fn find_by_user(
            &self,
            user: &MemberName,
            limit: usize,
        ) -> Result<Vec<Notification>, NotificationRepositoryError>;
        async fn find_by_id(
            &self,
            id: NotificationId,
        ) -> Result<Option<Notification>, NotificationRepositoryError>;
        async fn count_unread(
            &self,
            user: &MemberName,
        ) -> Result<usize, NotificationRepositoryError>;
        async fn mark_read(
            &self,
            id: NotificationId,
        ) -> Result<(), NotificationRepositoryError>;
        async fn mark_all_read(
            &self,
            user: &MemberName,
        ) -> Result<usize, NotificationRepositoryError>;
        fn subscribe(
            &self,
        ) -> Subscription<NotificationChange>;
    }
}

struct Harness {
    store: Arc<InMemoryNotificationRepository>,
    dispatcher: NotificationDispatcher<InMemoryNotificationRepository, FixedClock>,
    inbox: NotificationService<InMemoryNotificationRepository>,
    clock: Arc<FixedClock>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryNotificationRepository::new());
    let clock = Arc::new(FixedClock::on(2025, 1, 6));
    Harness {
        dispatcher: NotificationDispatcher::new(Arc::clone(&store), Arc::clone(&clock)),
        inbox: NotificationService::new(Arc::clone(&store)).with_inbox_size(3),
        store,
        clock,
    }
}

fn decision(owner: &str, outcome: DecisionOutcome) -> eyre::Result<Decision> {
    Ok(Decision::new(
        TaskId::new(),
        TaskTitle::new("Close 8D report")?,
        name(owner),
        name("Hariharan"),
        outcome,
    ))
}

#[rstest]
#[tokio::test]
async fn dispatcher_stores_one_notification_per_decision(harness: Harness) -> eyre::Result<()> {
    harness
        .dispatcher
        .notify(&decision("Ramesh", DecisionOutcome::ClosureApproved)?)
        .await?;

    let inbox = harness.inbox.inbox(&member("Ramesh")).await?;
    assert_eq!(inbox.len(), 1);
    let stored = inbox.first().ok_or_else(|| eyre::eyre!("missing notification"))?;
    assert_eq!(stored.kind(), NotificationKind::Success);
    assert_eq!(stored.title(), "Task Closure Approved");
    assert_eq!(stored.created_at(), harness.clock.utc());
    assert!(harness.inbox.inbox(&member("Suresh")).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn inbox_is_limited_and_newest_first(harness: Harness) -> eyre::Result<()> {
    for _ in 0..5 {
        harness
            .dispatcher
            .notify(&decision("Ramesh", DecisionOutcome::DateChangeRejected)?)
            .await?;
        harness.clock.advance_days(1);
    }

    let inbox = harness.inbox.inbox(&member("Ramesh")).await?;
    assert_eq!(inbox.len(), 3);
    assert!(
        inbox
            .windows(2)
            .all(|pair| matches!(pair, [newer, older] if newer.created_at() > older.created_at()))
    );
    assert_eq!(harness.inbox.unread_count(&member("Ramesh")).await?, 5);
    assert_eq!(harness.store.count_unread(&name("Ramesh")).await?, 5);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn only_the_recipient_marks_read(harness: Harness) -> eyre::Result<()> {
    harness
        .dispatcher
        .notify(&decision("Ramesh", DecisionOutcome::DateChangeRejected)?)
        .await?;
    let id = harness
        .inbox
        .inbox(&member("Ramesh"))
        .await?
        .first()
        .map(Notification::id)
        .ok_or_else(|| eyre::eyre!("missing notification"))?;

    let denied = harness.inbox.mark_read(&member("Suresh"), id).await;
    assert!(matches!(denied, Err(NotificationServiceError::NotRecipient(other)) if other == id));
    assert_eq!(harness.inbox.unread_count(&member("Ramesh")).await?, 1);

    harness.inbox.mark_read(&member("ramesh"), id).await?;
    harness.inbox.mark_read(&member("Ramesh"), id).await?;
    assert_eq!(harness.inbox.unread_count(&member("Ramesh")).await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn mark_all_read_counts_changes(harness: Harness) -> eyre::Result<()> {
    for outcome in [
        DecisionOutcome::ClosureApproved,
        DecisionOutcome::DateChangeRejected,
    ] {
        harness.dispatcher.notify(&decision("Ramesh", outcome)?).await?;
    }

    assert_eq!(harness.inbox.mark_all_read(&member("Ramesh")).await?, 2);
    assert_eq!(harness.inbox.mark_all_read(&member("Ramesh")).await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn unknown_notification_is_reported(harness: Harness) {
    let id = NotificationId::new();
    let result = harness.inbox.mark_read(&member("Ramesh"), id).await;
    assert!(matches!(result, Err(NotificationServiceError::NotFound(missing)) if missing == id));
}

#[rstest]
#[tokio::test]
async fn dispatcher_surfaces_store_failures() -> eyre::Result<()> {
    let mut store = MockStore::new();
    store.expect_append().times(1).returning(|_| {
        Err(NotificationRepositoryError::persistence(
            std::io::Error::other("disk full"),
        ))
    });
    let dispatcher =
        NotificationDispatcher::new(Arc::new(store), Arc::new(FixedClock::on(2025, 1, 6)));

    let result = dispatcher
        .notify(&decision("Ramesh", DecisionOutcome::ClosureApproved)?)
        .await;
    assert!(result.is_err());
    Ok(())
}
