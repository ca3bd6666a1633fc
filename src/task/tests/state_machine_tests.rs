//! Unit tests for task lifecycle transitions and their guards.

use super::task;
use crate::identity::domain::Role;
use crate::task::domain::{
    DecisionOutcome, RequestKind, Task, TaskDomainError, TaskPhase, TaskStatus, TaskTitle,
};
use crate::test_support::{FixedClock, date, hod, member, name};
use eyre::ensure;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> FixedClock {
    FixedClock::on(2025, 1, 6)
}

#[fixture]
fn open_task(clock: FixedClock) -> (Task, FixedClock) {
    (task("Audit casting supplier", "alice", "2025-01-10", &clock), clock)
}

fn with_pending_closure(clock: &FixedClock) -> eyre::Result<Task> {
    let mut pending = task("Close 8D report", "alice", "2025-01-10", clock);
    pending.request_closure(&member("alice"), "done", clock)?;
    Ok(pending)
}

fn with_pending_date_change(clock: &FixedClock) -> eyre::Result<Task> {
    let mut pending = task("Close 8D report", "alice", "2025-01-10", clock);
    pending.request_date_change(&member("alice"), date("2025-01-20"), "supplier delay", clock)?;
    Ok(pending)
}

#[rstest]
fn new_task_starts_open(open_task: (Task, FixedClock)) {
    let (created, clock) = open_task;
    assert_eq!(created.status(), TaskStatus::Open);
    assert_eq!(created.phase(), TaskPhase::Open);
    assert_eq!(created.created_on(), clock.today());
    assert_eq!(created.completed_on(), None);
    assert_eq!(created.current_target_date(), date("2025-01-10"));
    assert_eq!(created.target_date_history().len(), 1);
    assert!(!created.is_subtask());
}

#[rstest]
fn approved_date_change_extends_history(open_task: (Task, FixedClock)) -> eyre::Result<()> {
    let (mut subject, clock) = open_task;
    subject.request_date_change(&member("Alice"), date("2025-01-20"), " supplier delay ", &clock)?;
    assert_eq!(subject.phase(), TaskPhase::OpenDateChangePending);
    assert_eq!(subject.current_target_date(), date("2025-01-10"));
    assert_eq!(
        subject.date_change_request().map(|request| request.reason()),
        Some("supplier delay")
    );

    let decision = subject.approve_date_change(&hod("Hariharan"), &clock)?;

    assert_eq!(
        decision.outcome(),
        &DecisionOutcome::DateChangeApproved {
            new_date: date("2025-01-20")
        }
    );
    assert_eq!(decision.owner(), &name("alice"));
    assert_eq!(subject.current_target_date(), date("2025-01-20"));
    let history: Vec<_> = subject.target_date_history().dates().collect();
    assert_eq!(history, vec![date("2025-01-10"), date("2025-01-20")]);
    assert_eq!(subject.date_change_approved_by(), Some(&name("Hariharan")));
    assert!(!subject.is_date_change_pending());
    Ok(())
}

#[rstest]
fn history_grows_by_one_per_approval(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = task("Audit", "alice", "2025-01-10", &clock);
    for (index, requested) in ["2025-01-15", "2025-01-10", "2025-02-01"].iter().enumerate() {
        subject.request_date_change(&member("alice"), date(requested), "moved", &clock)?;
        subject.approve_date_change(&hod("Hariharan"), &clock)?;
        ensure!(subject.target_date_history().move_count() == index + 1);
        ensure!(subject.current_target_date() == date(requested));
    }
    Ok(())
}

#[rstest]
fn rejected_date_change_leaves_history(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_date_change(&clock)?;
    let decision = subject.reject_date_change(&hod("Hariharan"), &clock)?;

    assert_eq!(decision.outcome(), &DecisionOutcome::DateChangeRejected);
    assert_eq!(subject.current_target_date(), date("2025-01-10"));
    assert_eq!(subject.target_date_history().len(), 1);
    assert!(!subject.is_date_change_pending());
    Ok(())
}

#[rstest]
fn closure_request_then_rejection_keeps_task_open(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    assert_eq!(subject.phase(), TaskPhase::OpenClosurePending);
    assert_eq!(
        subject.closure_request().map(|request| request.requested_by().clone()),
        Some(name("alice"))
    );

    let decision = subject.reject_closure(&hod("Hariharan"), "insufficient evidence", &clock)?;

    assert_eq!(
        decision.outcome(),
        &DecisionOutcome::ClosureRejected {
            reason: "insufficient evidence".to_owned()
        }
    );
    assert!(!subject.is_closure_pending());
    assert_eq!(
        subject.closure_rejection_comment(),
        Some("insufficient evidence")
    );
    assert_eq!(subject.status(), TaskStatus::Open);
    Ok(())
}

#[rstest]
fn approved_closure_closes_today(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    subject.reject_closure(&hod("Hariharan"), "missing photos", &clock)?;
    subject.request_closure(&member("alice"), "photos attached", &clock)?;
    subject.request_date_change(&member("alice"), date("2025-01-30"), "buffer", &clock)?;
    clock.advance_days(3);

    let decision = subject.approve_closure(&hod("Hariharan"), &clock)?;

    assert_eq!(decision.outcome(), &DecisionOutcome::ClosureApproved);
    assert_eq!(subject.status(), TaskStatus::Closed);
    assert_eq!(subject.phase(), TaskPhase::Closed);
    assert_eq!(subject.completed_on(), Some(date("2025-01-09")));
    assert_eq!(subject.closure_approved_by(), Some(&name("Hariharan")));
    assert_eq!(subject.closure_rejection_comment(), None);
    assert!(!subject.is_closure_pending());
    assert!(!subject.is_date_change_pending());
    Ok(())
}

#[rstest]
#[case::approve_date_change(RequestKind::DateChange, true)]
#[case::reject_date_change(RequestKind::DateChange, false)]
#[case::approve_closure(RequestKind::Closure, true)]
#[case::reject_closure(RequestKind::Closure, false)]
fn team_members_cannot_decide(
    clock: FixedClock,
    #[case] kind: RequestKind,
    #[case] approve: bool,
) -> eyre::Result<()> {
    let mut subject = match kind {
        RequestKind::DateChange => with_pending_date_change(&clock)?,
        RequestKind::Closure => with_pending_closure(&clock)?,
    };
    let before = subject.clone();
    let actor = member("alice");

    let result = match (kind, approve) {
        (RequestKind::DateChange, true) => subject.approve_date_change(&actor, &clock),
        (RequestKind::DateChange, false) => subject.reject_date_change(&actor, &clock),
        (RequestKind::Closure, true) => subject.approve_closure(&actor, &clock),
        (RequestKind::Closure, false) => subject.reject_closure(&actor, "no", &clock),
    };

    match result {
        Err(TaskDomainError::Forbidden(forbidden)) => {
            assert_eq!(forbidden.required, Role::Hod);
            assert_eq!(forbidden.actor, name("alice"));
        }
        other => eyre::bail!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(subject, before);
    Ok(())
}

#[rstest]
fn second_rejection_is_not_pending(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    subject.reject_closure(&hod("Hariharan"), "first", &clock)?;
    let after_first = subject.clone();

    let result = subject.reject_closure(&hod("Hariharan"), "second", &clock);

    assert_eq!(
        result,
        Err(TaskDomainError::NotPending {
            task_id: subject.id(),
            kind: RequestKind::Closure
        })
    );
    assert_eq!(subject, after_first);
    Ok(())
}

#[rstest]
fn decisions_without_request_are_not_pending(open_task: (Task, FixedClock)) {
    let (mut subject, clock) = open_task;
    let head = hod("Hariharan");
    let id = subject.id();
    let date_change = TaskDomainError::NotPending {
        task_id: id,
        kind: RequestKind::DateChange,
    };
    let closure = TaskDomainError::NotPending {
        task_id: id,
        kind: RequestKind::Closure,
    };

    assert_eq!(subject.approve_date_change(&head, &clock), Err(date_change.clone()));
    assert_eq!(subject.reject_date_change(&head, &clock), Err(date_change));
    assert_eq!(subject.approve_closure(&head, &clock), Err(closure.clone()));
    assert_eq!(subject.reject_closure(&head, "why", &clock), Err(closure));
}

#[rstest]
fn blank_rejection_comment_is_refused(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    let before = subject.clone();
    assert_eq!(
        subject.reject_closure(&hod("Hariharan"), "  ", &clock),
        Err(TaskDomainError::EmptyComment)
    );
    assert_eq!(subject, before);
    Ok(())
}

#[rstest]
fn only_the_owner_requests(open_task: (Task, FixedClock)) {
    let (mut subject, clock) = open_task;
    let before = subject.clone();
    let not_owner = TaskDomainError::NotOwner {
        task_id: subject.id(),
        actor: name("Ramesh"),
        owner: name("alice"),
    };

    assert_eq!(
        subject.request_date_change(&member("Ramesh"), date("2025-02-01"), "busy", &clock),
        Err(not_owner.clone())
    );
    assert_eq!(
        subject.request_closure(&member("Ramesh"), "done", &clock),
        Err(not_owner)
    );
    assert_eq!(subject, before);
}

#[rstest]
fn request_validation_runs_after_ownership(open_task: (Task, FixedClock)) {
    let (mut subject, clock) = open_task;
    assert_eq!(
        subject.request_date_change(&member("alice"), date("2025-02-01"), " ", &clock),
        Err(TaskDomainError::EmptyReason)
    );
    assert_eq!(
        subject.request_closure(&member("alice"), "", &clock),
        Err(TaskDomainError::EmptyComment)
    );
    assert_eq!(subject.phase(), TaskPhase::Open);
}

#[rstest]
fn duplicate_requests_are_already_pending(clock: FixedClock) -> eyre::Result<()> {
    let mut closure = with_pending_closure(&clock)?;
    assert_eq!(
        closure.request_closure(&member("Ramesh"), "again", &clock),
        Err(TaskDomainError::AlreadyPending {
            task_id: closure.id(),
            kind: RequestKind::Closure
        })
    );

    let mut date_change = with_pending_date_change(&clock)?;
    assert_eq!(
        date_change.request_date_change(&member("alice"), date("2025-03-01"), "again", &clock),
        Err(TaskDomainError::AlreadyPending {
            task_id: date_change.id(),
            kind: RequestKind::DateChange
        })
    );
    Ok(())
}

#[rstest]
fn closed_task_refuses_requests(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    subject.approve_closure(&hod("Hariharan"), &clock)?;
    let closed = TaskDomainError::TaskClosed(subject.id());

    assert_eq!(
        subject.request_closure(&member("Ramesh"), "done", &clock),
        Err(closed.clone())
    );
    assert_eq!(
        subject.request_date_change(&member("alice"), date("2025-02-01"), "late", &clock),
        Err(closed.clone())
    );
    assert_eq!(
        subject.update_details(&hod("Hariharan"), None, Some("note".to_owned()), &clock),
        Err(closed)
    );
    Ok(())
}

#[rstest]
#[case::owner(member("alice"))]
#[case::hod(hod("Hariharan"))]
#[case::other_member(member("Ramesh"))]
fn waiting_task_is_blocked_for_everyone(
    clock: FixedClock,
    #[case] actor: crate::identity::domain::Actor,
) -> eyre::Result<()> {
    let mut parent = task("Supplier audit", "alice", "2025-01-31", &clock);
    parent.spawn_subtask(
        &hod("Hariharan"),
        TaskTitle::new("Collect records")?,
        name("Ramesh"),
        date("2025-01-15"),
        &clock,
    )?;

    assert_eq!(
        parent.request_closure(&actor, "done", &clock),
        Err(TaskDomainError::Blocked(parent.id()))
    );
    Ok(())
}

#[rstest]
fn spawning_a_subtask_blocks_the_parent(clock: FixedClock) -> eyre::Result<()> {
    let mut parent = with_pending_closure(&clock)?;

    let child = parent.spawn_subtask(
        &hod("Hariharan"),
        TaskTitle::new("Collect records")?,
        name("Ramesh"),
        date("2025-01-15"),
        &clock,
    )?;

    assert_eq!(child.parent_id(), Some(parent.id()));
    assert_eq!(child.owner(), &name("Ramesh"));
    assert_eq!(child.phase(), TaskPhase::Open);
    assert!(parent.is_waiting_for_subtask());
    assert!(!parent.is_closure_pending());
    assert_eq!(parent.phase(), TaskPhase::OpenBlocked);
    Ok(())
}

#[rstest]
fn only_hod_spawns_subtasks_on_open_tasks(clock: FixedClock) -> eyre::Result<()> {
    let mut parent = task("Supplier audit", "alice", "2025-01-31", &clock);
    let title = TaskTitle::new("Collect records")?;
    let denied = parent.spawn_subtask(
        &member("alice"),
        title.clone(),
        name("Ramesh"),
        date("2025-01-15"),
        &clock,
    );
    assert!(matches!(denied, Err(TaskDomainError::Forbidden(_))));
    assert!(!parent.is_waiting_for_subtask());

    let mut closed = with_pending_closure(&clock)?;
    closed.approve_closure(&hod("Hariharan"), &clock)?;
    let refused = closed.spawn_subtask(
        &hod("Hariharan"),
        title,
        name("Ramesh"),
        date("2025-01-15"),
        &clock,
    );
    assert_eq!(refused, Err(TaskDomainError::TaskClosed(closed.id())));
    Ok(())
}

#[rstest]
fn subtasks_do_not_nest(clock: FixedClock) -> eyre::Result<()> {
    let mut parent = task("Supplier audit", "alice", "2025-01-31", &clock);
    let mut child = parent.spawn_subtask(
        &hod("Hariharan"),
        TaskTitle::new("Collect records")?,
        name("Ramesh"),
        date("2025-01-15"),
        &clock,
    )?;
    let before = child.clone();

    let nested = child.spawn_subtask(
        &hod("Hariharan"),
        TaskTitle::new("Scan certificates")?,
        name("alice"),
        date("2025-01-12"),
        &clock,
    );

    assert_eq!(nested, Err(TaskDomainError::NestedSubtask(child.id())));
    assert_eq!(child, before);
    assert!(!child.is_waiting_for_subtask());
    Ok(())
}

#[rstest]
fn details_are_editable_by_owner_or_hod(open_task: (Task, FixedClock)) -> eyre::Result<()> {
    let (mut subject, clock) = open_task;
    subject.update_details(
        &member("alice"),
        Some(TaskTitle::new("Audit casting supplier (Q1)")?),
        Some("  bring gauges ".to_owned()),
        &clock,
    )?;
    assert_eq!(subject.title().as_str(), "Audit casting supplier (Q1)");
    assert_eq!(subject.notes(), Some("bring gauges"));

    subject.update_details(&hod("Hariharan"), None, Some(String::new()), &clock)?;
    assert_eq!(subject.notes(), None);

    let denied = subject.update_details(&member("Ramesh"), None, Some("x".to_owned()), &clock);
    assert!(matches!(denied, Err(TaskDomainError::NotOwner { .. })));
    assert_eq!(subject.current_target_date(), date("2025-01-10"));
    Ok(())
}

#[rstest]
fn deadline_projections_skip_waiting_tasks(clock: FixedClock) -> eyre::Result<()> {
    let today = clock.today();
    let overdue = task("Late", "alice", "2025-01-05", &clock);
    let due = task("Due", "alice", "2025-01-06", &clock);
    let mut waiting = task("Waiting", "alice", "2025-01-05", &clock);
    waiting.spawn_subtask(
        &hod("Hariharan"),
        TaskTitle::new("Child")?,
        name("Ramesh"),
        date("2025-01-20"),
        &clock,
    )?;

    ensure!(overdue.is_overdue(today) && !overdue.is_due_today(today));
    ensure!(due.is_due_today(today) && !due.is_overdue(today));
    ensure!(!waiting.is_overdue(today));
    ensure!(waiting.has_slipped(today));
    Ok(())
}

#[rstest]
fn closed_late_counts_as_slipped(clock: FixedClock) -> eyre::Result<()> {
    let mut subject = with_pending_closure(&clock)?;
    clock.advance_days(10);
    subject.approve_closure(&hod("Hariharan"), &clock)?;

    ensure!(subject.has_slipped(clock.today()));
    ensure!(!subject.is_overdue(clock.today()));
    Ok(())
}
