//! Decision notifications delivered to task owners.

use super::helpers::team;
use sqtrack::notification::{domain::NotificationKind, services::NotificationServiceError};

#[tokio::test(flavor = "multi_thread")]
async fn approval_lands_in_owner_inbox() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Confirm gauge R&R", "Ramesh").await?;
    let tasks = team.tracker.tasks();
    let inbox = team.tracker.notifications();

    tasks
        .request_date_change(&team.ramesh, task.id(), "2099-09-09", "gauge recalibration")
        .await?;
    tasks.approve_date_change(&team.hod, task.id()).await?;

    let received = inbox.inbox(&team.ramesh).await?;
    assert_eq!(received.len(), 1);
    let notification = received
        .first()
        .ok_or_else(|| eyre::eyre!("expected one notification"))?;
    assert_eq!(notification.kind(), NotificationKind::Success);
    assert_eq!(notification.title(), "Date Change Approved");
    assert!(notification.message().contains("Confirm gauge R&R"));
    assert!(notification.message().contains("2099-09-09"));
    assert_eq!(notification.task_id(), Some(task.id()));
    assert!(inbox.inbox(&team.suresh).await?.is_empty());
    assert_eq!(inbox.unread_count(&team.ramesh).await?, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn closure_rejection_warns_with_reason() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Close NCR 42", "Suresh").await?;
    let tasks = team.tracker.tasks();

    tasks
        .request_closure(&team.suresh, task.id(), "rework complete")
        .await?;
    tasks
        .reject_closure(&team.hod, task.id(), "missing inspection report")
        .await?;

    let received = team.tracker.notifications().inbox(&team.suresh).await?;
    let notification = received
        .first()
        .ok_or_else(|| eyre::eyre!("expected a rejection notification"))?;
    assert_eq!(notification.kind(), NotificationKind::Warning);
    assert!(notification.message().contains("missing inspection report"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn only_recipient_marks_read() -> eyre::Result<()> {
    let team = team().await?;
    let first = team.task_for("First", "Ramesh").await?;
    let second = team.task_for("Second", "Ramesh").await?;
    let tasks = team.tracker.tasks();
    let inbox = team.tracker.notifications();
    for task in [&first, &second] {
        tasks
            .request_closure(&team.ramesh, task.id(), "done")
            .await?;
        tasks.approve_closure(&team.hod, task.id()).await?;
    }

    let received = inbox.inbox(&team.ramesh).await?;
    let newest = received
        .first()
        .ok_or_else(|| eyre::eyre!("expected notifications"))?;
    let stolen = inbox.mark_read(&team.suresh, newest.id()).await;
    assert!(matches!(
        stolen,
        Err(NotificationServiceError::NotRecipient(_))
    ));

    inbox.mark_read(&team.ramesh, newest.id()).await?;
    assert_eq!(inbox.unread_count(&team.ramesh).await?, 1);
    assert_eq!(inbox.mark_all_read(&team.ramesh).await?, 1);
    assert_eq!(inbox.unread_count(&team.ramesh).await?, 0);
    Ok(())
}
