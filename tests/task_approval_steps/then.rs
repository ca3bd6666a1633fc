//! Then steps for task approval BDD scenarios.

use super::world::{ApprovalWorld, run_async};
use rstest_bdd_macros::then;
use sqtrack::notification::domain::NotificationKind;
use sqtrack::task::{
    domain::{TaskDomainError, TaskStatus, parse_calendar_date},
    services::TaskLifecycleError,
};

#[then(r#""{title}" is due on "{date}""#)]
fn is_due_on(world: &ApprovalWorld, title: String, date: String) -> Result<(), eyre::Report> {
    let expected = parse_calendar_date(&date)?;
    let task = world.reload(&title)?;
    eyre::ensure!(
        task.current_target_date() == expected,
        "expected '{title}' due {expected}, found {}",
        task.current_target_date()
    );
    Ok(())
}

#[then(r#""{title}" has {count:usize} target dates"#)]
fn has_target_dates(world: &ApprovalWorld, title: String, count: usize) -> Result<(), eyre::Report> {
    let task = world.reload(&title)?;
    let found = task.target_date_history().len();
    eyre::ensure!(found == count, "expected {count} target dates, found {found}");
    Ok(())
}

#[then(r#""{title}" has status "{status}""#)]
fn has_status(world: &ApprovalWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.reload(&title)?;
    eyre::ensure!(
        task.status() == expected,
        "expected '{title}' to be {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then(r#""{title}" records the rejection "{comment}""#)]
fn records_rejection(world: &ApprovalWorld, title: String, comment: String) -> Result<(), eyre::Report> {
    let task = world.reload(&title)?;
    eyre::ensure!(
        task.closure_rejection_comment() == Some(comment.as_str()),
        "expected rejection comment {comment:?}, found {:?}",
        task.closure_rejection_comment()
    );
    eyre::ensure!(!task.is_closure_pending(), "closure should no longer be pending");
    Ok(())
}

#[then(r#""{name}" has {count:usize} "{kind}" notification"#)]
fn has_notifications(
    world: &ApprovalWorld,
    name: String,
    count: usize,
    kind: String,
) -> Result<(), eyre::Report> {
    let expected = NotificationKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid notification kind in scenario: {err}"))?;
    let actor = world.actor(&name)?;
    let inbox = run_async(world.tracker()?.notifications().inbox(&actor))?;
    let found = inbox
        .iter()
        .filter(|notification| notification.kind() == expected)
        .count();
    eyre::ensure!(found == count, "expected {count} {kind} notifications, found {found}");
    Ok(())
}

#[then("the last action was forbidden")]
fn last_action_forbidden(world: &ApprovalWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing last outcome"))?;
    eyre::ensure!(
        matches!(
            outcome,
            Err(TaskLifecycleError::Domain(TaskDomainError::Forbidden(_)))
        ),
        "expected Forbidden, got {outcome:?}"
    );
    Ok(())
}

#[then("the last action was blocked")]
fn last_action_blocked(world: &ApprovalWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing last outcome"))?;
    eyre::ensure!(
        matches!(
            outcome,
            Err(TaskLifecycleError::Domain(TaskDomainError::Blocked(_)))
        ),
        "expected Blocked, got {outcome:?}"
    );
    Ok(())
}
