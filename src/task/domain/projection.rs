//! Read-only dashboard projections over a set of tasks.

use super::Task;
use crate::identity::domain::MemberName;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Share of tasks closed, rounded half-up to a whole percent.
///
/// Returns `None` when `whole` is zero.
fn rounded_percent(part: usize, whole: usize) -> Option<u8> {
    let doubled_whole = whole.checked_mul(2)?;
    part.saturating_mul(200)
        .saturating_add(whole)
        .checked_div(doubled_whole)
        .map(|percent| u8::try_from(percent).unwrap_or(u8::MAX))
}

/// Closed tasks against the tasks that can be worked on.
///
/// Tasks waiting for subtasks are excluded from the effective total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionRate {
    closed: usize,
    total: usize,
    blocked: usize,
}

impl ExecutionRate {
    /// Computes the rate over `tasks`.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut rate, task| {
            rate.total += 1;
            if !task.is_open() {
                rate.closed += 1;
            }
            if task.is_waiting_for_subtask() {
                rate.blocked += 1;
            }
            rate
        })
    }

    /// Returns the number of closed tasks.
    #[must_use]
    pub const fn closed(&self) -> usize {
        self.closed
    }

    /// Returns the number of tasks considered.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns the total minus tasks waiting for subtasks.
    #[must_use]
    pub const fn effective_total(&self) -> usize {
        self.total.saturating_sub(self.blocked)
    }

    /// Returns the execution rate as a whole percent.
    ///
    /// 0 when there are no tasks at all, 100 when every task is blocked.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        rounded_percent(self.closed, self.effective_total()).unwrap_or(100)
    }
}

/// Personal dashboard figures for one team member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStats {
    /// Tasks owned.
    pub total: usize,
    /// Open tasks.
    pub open: usize,
    /// Closed tasks.
    pub closed: usize,
    /// Tasks waiting for subtasks.
    pub blocked: usize,
    /// Execution rate.
    pub execution: ExecutionRate,
    /// Tasks due today.
    pub due_today: usize,
    /// Overdue tasks.
    pub overdue: usize,
    /// Closure requests awaiting the HOD.
    pub pending_closure: usize,
    /// Date-change requests awaiting the HOD.
    pub pending_date_change: usize,
    /// Approved date moves across all tasks.
    pub date_moves: usize,
    /// Open tasks carrying a closure rejection comment.
    pub rejected_closures: usize,
}

impl MemberStats {
    /// Computes figures over the tasks `member` owns.
    #[must_use]
    pub fn for_member(tasks: &[Task], member: &MemberName, on: NaiveDate) -> Self {
        let owned: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.owner().same_member(member))
            .collect();
        let count = |predicate: &dyn Fn(&Task) -> bool| {
            owned.iter().filter(|task| predicate(task)).count()
        };
        Self {
            total: owned.len(),
            open: count(&Task::is_open),
            closed: count(&|task| !task.is_open()),
            blocked: count(&Task::is_waiting_for_subtask),
            execution: ExecutionRate::from_tasks(owned.iter().copied()),
            due_today: count(&|task| task.is_due_today(on)),
            overdue: count(&|task| task.is_overdue(on)),
            pending_closure: count(&Task::is_closure_pending),
            pending_date_change: count(&Task::is_date_change_pending),
            date_moves: owned
                .iter()
                .map(|task| task.target_date_history().move_count())
                .sum(),
            rejected_closures: count(&|task| {
                task.is_open() && task.closure_rejection_comment().is_some()
            }),
        }
    }
}

/// Department dashboard figures for the HOD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStats {
    /// All tasks.
    pub total: usize,
    /// Open tasks.
    pub open: usize,
    /// Closed tasks.
    pub closed: usize,
    /// Execution rate.
    pub execution: ExecutionRate,
    /// Tasks due today.
    pub due_today: usize,
    /// Overdue tasks.
    pub overdue: usize,
    /// Overdue tasks as a whole percent of open tasks.
    pub overdue_ratio: u8,
    /// Approved date moves across all tasks.
    pub total_moves: usize,
    /// Approved date moves per owner; owners without moves are omitted.
    pub moves_by_owner: BTreeMap<MemberName, usize>,
    /// Missed deadlines per owner; owners without slips are omitted.
    pub slips_by_owner: BTreeMap<MemberName, usize>,
}

impl TeamStats {
    /// Computes figures over every task.
    #[must_use]
    pub fn from_tasks(tasks: &[Task], on: NaiveDate) -> Self {
        let open = tasks.iter().filter(|task| task.is_open()).count();
        let overdue = tasks.iter().filter(|task| task.is_overdue(on)).count();
        let mut moves_by_owner = BTreeMap::new();
        let mut slips_by_owner = BTreeMap::new();
        for task in tasks {
            let moves = task.target_date_history().move_count();
            if moves > 0 {
                *moves_by_owner.entry(task.owner().clone()).or_insert(0) += moves;
            }
            if task.has_slipped(on) {
                *slips_by_owner.entry(task.owner().clone()).or_insert(0) += 1;
            }
        }
        Self {
            total: tasks.len(),
            open,
            closed: tasks.len().saturating_sub(open),
            execution: ExecutionRate::from_tasks(tasks),
            due_today: tasks.iter().filter(|task| task.is_due_today(on)).count(),
            overdue,
            overdue_ratio: rounded_percent(overdue, open).unwrap_or(0),
            total_moves: moves_by_owner.values().sum(),
            moves_by_owner,
            slips_by_owner,
        }
    }

    /// Owners ordered by slip count, worst first.
    #[must_use]
    pub fn worst_slippers(&self) -> Vec<(&MemberName, usize)> {
        let mut ranked: Vec<(&MemberName, usize)> = self
            .slips_by_owner
            .iter()
            .map(|(owner, slips)| (owner, *slips))
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        ranked
    }
}
