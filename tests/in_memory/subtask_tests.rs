//! Subtask blocking and the parent cascade.

use super::helpers::{FUTURE_DATE, team};
use sqtrack::task::{
    domain::{StatusFilter, TaskDomainError, TaskFilter, TaskStatus},
    services::{AddSubtaskRequest, TaskLifecycleError},
};

#[tokio::test(flavor = "multi_thread")]
async fn parent_closes_after_last_subtask() -> eyre::Result<()> {
    let team = team().await?;
    let parent = team.task_for("Qualify new casting supplier", "Ramesh").await?;
    let tasks = team.tracker.tasks();

    let first = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(parent.id(), "Run capability study", "Ramesh", FUTURE_DATE),
        )
        .await?;
    let second = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(parent.id(), "Audit the foundry", "Suresh", FUTURE_DATE),
        )
        .await?;
    assert!(team.reload(&parent).await?.is_waiting_for_subtask());

    let blocked = tasks
        .request_closure(&team.ramesh, parent.id(), "all done")
        .await;
    assert!(matches!(
        blocked,
        Err(TaskLifecycleError::Domain(TaskDomainError::Blocked(_)))
    ));

    tasks
        .request_closure(&team.ramesh, first.id(), "Cpk 1.67")
        .await?;
    let first_closed = tasks.approve_closure(&team.hod, first.id()).await?;
    assert!(first_closed.parent_closed.is_none());
    let still_blocked = team.reload(&parent).await?;
    assert_eq!(still_blocked.status(), TaskStatus::Open);
    assert!(still_blocked.is_waiting_for_subtask());

    tasks
        .request_closure(&team.suresh, second.id(), "audit passed")
        .await?;
    let second_closed = tasks.approve_closure(&team.hod, second.id()).await?;
    let closed_parent = second_closed
        .parent_closed
        .ok_or_else(|| eyre::eyre!("parent should close with its last subtask"))?;
    assert_eq!(closed_parent.id(), parent.id());
    assert_eq!(closed_parent.status(), TaskStatus::Closed);
    assert!(!closed_parent.is_waiting_for_subtask());
    assert!(closed_parent.completed_on().is_some());
    assert_eq!(team.reload(&parent).await?, closed_parent);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_parent_removes_subtree() -> eyre::Result<()> {
    let team = team().await?;
    let parent = team.task_for("Tooling transfer", "Ramesh").await?;
    let keep = team.task_for("Unrelated audit", "Suresh").await?;
    let tasks = team.tracker.tasks();
    let child = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(parent.id(), "Ship dies", "Suresh", FUTURE_DATE),
        )
        .await?;

    let forbidden = tasks.delete_task(&team.ramesh, parent.id()).await;
    assert!(matches!(
        forbidden,
        Err(TaskLifecycleError::Domain(TaskDomainError::Forbidden(_)))
    ));

    let deleted = tasks.delete_task(&team.hod, parent.id()).await?;
    assert_eq!(deleted, vec![child.id(), parent.id()]);
    let remaining = tasks.list_tasks(&TaskFilter::new()).await?;
    assert_eq!(remaining, vec![keep]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_nests_subtasks_and_filters() -> eyre::Result<()> {
    let team = team().await?;
    let parent = team.task_for("Supplier onboarding", "Ramesh").await?;
    let tasks = team.tracker.tasks();
    let child = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(parent.id(), "Collect certificates", "Suresh", FUTURE_DATE),
        )
        .await?;
    let later = team.task_for("Annual supplier review", "Suresh").await?;

    let all = tasks.list_tasks(&TaskFilter::new()).await?;
    let ids: Vec<_> = all.iter().map(sqtrack::task::domain::Task::id).collect();
    assert_eq!(ids, vec![later.id(), parent.id(), child.id()]);

    let suresh_open = tasks
        .list_tasks(
            &TaskFilter::new()
                .for_owner("SURESH")
                .with_status(StatusFilter::Open),
        )
        .await?;
    assert_eq!(suresh_open.len(), 2);

    let searched = tasks
        .list_tasks(&TaskFilter::new().with_search("certificates"))
        .await?;
    assert_eq!(searched.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn subtasks_cannot_have_their_own_subtasks() -> eyre::Result<()> {
    let team = team().await?;
    let root = team.task_for("PPAP for bracket", "Ramesh").await?;
    let tasks = team.tracker.tasks();
    let mid = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(root.id(), "Dimensional report", "Suresh", FUTURE_DATE),
        )
        .await?;

    let nested = tasks
        .add_subtask(
            &team.hod,
            AddSubtaskRequest::new(mid.id(), "Measure holes", "Ramesh", FUTURE_DATE),
        )
        .await;
    assert!(matches!(
        nested,
        Err(TaskLifecycleError::Domain(TaskDomainError::NestedSubtask(id))) if id == mid.id()
    ));
    assert!(!team.reload(&mid).await?.is_waiting_for_subtask());
    assert_eq!(tasks.list_tasks(&TaskFilter::new()).await?.len(), 2);

    tasks
        .request_closure(&team.suresh, mid.id(), "report filed")
        .await?;
    let approval = tasks.approve_closure(&team.hod, mid.id()).await?;
    let closed_root = approval
        .parent_closed
        .ok_or_else(|| eyre::eyre!("root should close with its only subtask"))?;
    assert_eq!(closed_root.id(), root.id());
    assert_eq!(team.reload(&root).await?.status(), TaskStatus::Closed);
    Ok(())
}
