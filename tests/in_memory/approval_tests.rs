//! Approval decisions driven through the bootstrapped tracker.

use super::helpers::{FUTURE_DATE, team};
use chrono::NaiveDate;
use sqtrack::task::{
    domain::{TaskDomainError, TaskPhase, TaskStatus},
    services::TaskLifecycleError,
};

fn day(raw: &str) -> eyre::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

#[tokio::test(flavor = "multi_thread")]
async fn approved_date_change_extends_history() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Validate PPAP for bracket", "Ramesh").await?;
    let tasks = team.tracker.tasks();

    let requested = tasks
        .request_date_change(&team.ramesh, task.id(), "2099-07-15", "supplier holiday")
        .await?;
    assert_eq!(requested.phase(), TaskPhase::OpenDateChangePending);

    let approved = tasks.approve_date_change(&team.hod, task.id()).await?;
    assert_eq!(approved.current_target_date(), day("2099-07-15")?);
    assert_eq!(
        approved.target_date_history().dates().collect::<Vec<_>>(),
        vec![day(FUTURE_DATE)?, day("2099-07-15")?]
    );
    assert!(!approved.is_date_change_pending());
    assert_eq!(team.reload(&task).await?, approved);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_date_change_keeps_target() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Review control plan", "Ramesh").await?;
    let tasks = team.tracker.tasks();

    tasks
        .request_date_change(&team.ramesh, task.id(), "2099-12-01", "awaiting samples")
        .await?;
    let rejected = tasks.reject_date_change(&team.hod, task.id()).await?;

    assert_eq!(rejected.current_target_date(), day(FUTURE_DATE)?);
    assert_eq!(rejected.target_date_history().len(), 1);
    assert!(rejected.date_change_request().is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn closure_rejection_then_approval() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Close 8D report", "Ramesh").await?;
    let tasks = team.tracker.tasks();

    tasks
        .request_closure(&team.ramesh, task.id(), "containment done")
        .await?;
    let rejected = tasks
        .reject_closure(&team.hod, task.id(), "attach the audit evidence")
        .await?;
    assert_eq!(rejected.status(), TaskStatus::Open);
    assert_eq!(
        rejected.closure_rejection_comment(),
        Some("attach the audit evidence")
    );

    let again = tasks.reject_closure(&team.hod, task.id(), "twice").await;
    assert!(matches!(
        again,
        Err(TaskLifecycleError::Domain(TaskDomainError::NotPending { .. }))
    ));

    tasks
        .request_closure(&team.ramesh, task.id(), "evidence attached")
        .await?;
    let approval = tasks.approve_closure(&team.hod, task.id()).await?;
    assert_eq!(approval.task.status(), TaskStatus::Closed);
    assert!(approval.task.completed_on().is_some());
    assert!(approval.parent_closed.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn members_cannot_decide_or_act_for_others() -> eyre::Result<()> {
    let team = team().await?;
    let task = team.task_for("Supplier capacity study", "Ramesh").await?;
    let tasks = team.tracker.tasks();

    let foreign = tasks
        .request_closure(&team.suresh, task.id(), "not mine")
        .await;
    assert!(matches!(
        foreign,
        Err(TaskLifecycleError::Domain(TaskDomainError::NotOwner { .. }))
    ));

    tasks
        .request_date_change(&team.ramesh, task.id(), "2099-08-01", "tooling delay")
        .await?;
    let self_approved = tasks.approve_date_change(&team.ramesh, task.id()).await;
    assert!(matches!(
        self_approved,
        Err(TaskLifecycleError::Domain(TaskDomainError::Forbidden(_)))
    ));
    assert!(team.reload(&task).await?.is_date_change_pending());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn hod_cannot_own_tasks() -> eyre::Result<()> {
    let team = team().await?;
    let result = team.task_for("Self assigned", "Hariharan").await;
    assert!(result.is_err());
    Ok(())
}
