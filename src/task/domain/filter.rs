//! Task list filtering and display ordering.

use super::{Task, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Error returned while parsing a status filter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status filter: {0}")]
pub struct ParseStatusFilterError(pub String);

/// Status selector for task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Open tasks.
    Open,
    /// Closed tasks.
    Closed,
    /// Overdue tasks.
    Overdue,
    /// Tasks with a closure request awaiting the HOD.
    PendingClosure,
}

impl StatusFilter {
    fn accepts(self, task: &Task, on: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Open => task.is_open(),
            Self::Closed => !task.is_open(),
            Self::Overdue => task.is_overdue(on),
            Self::PendingClosure => task.is_closure_pending(),
        }
    }
}

impl TryFrom<&str> for StatusFilter {
    type Error = ParseStatusFilterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "overdue" => Ok(Self::Overdue),
            "pending_closure" => Ok(Self::PendingClosure),
            _ => Err(ParseStatusFilterError(value.to_owned())),
        }
    }
}

/// Criteria for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    owner: Option<String>,
    status: StatusFilter,
    search: Option<String>,
}

impl TaskFilter {
    /// Matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to tasks owned by `owner`, ignoring case.
    #[must_use]
    pub fn for_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Restricts by status.
    #[must_use]
    pub const fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Restricts to titles containing `text`, ignoring case. Blank text is
    /// ignored.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let needle = text.into();
        self.search = (!needle.trim().is_empty()).then_some(needle);
        self
    }

    /// Returns `true` when `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task, on: NaiveDate) -> bool {
        let owner_matches = self
            .owner
            .as_deref()
            .is_none_or(|owner| task.owner().matches(owner));
        let search_matches = self
            .search
            .as_deref()
            .is_none_or(|needle| task.title().contains_ignore_case(needle));
        owner_matches && search_matches && self.status.accepts(task, on)
    }

    /// Keeps the matching tasks, preserving order.
    #[must_use]
    pub fn apply(&self, tasks: Vec<Task>, on: NaiveDate) -> Vec<Task> {
        tasks
            .into_iter()
            .filter(|task| self.matches(task, on))
            .collect()
    }
}

/// Orders tasks so each top-level task is followed by its subtasks.
///
/// Relative order within each level is preserved. Subtasks whose parent is
/// not in `tasks` are treated as top-level.
#[must_use]
pub fn hierarchical_order(tasks: Vec<Task>) -> Vec<Task> {
    let ids: HashSet<TaskId> = tasks.iter().map(Task::id).collect();
    let mut children: HashMap<TaskId, Vec<Task>> = HashMap::new();
    let mut roots = Vec::new();
    for task in tasks {
        match task.parent_id().filter(|parent| ids.contains(parent)) {
            Some(parent) => children.entry(parent).or_default().push(task),
            None => roots.push(task),
        }
    }

    let mut ordered = Vec::with_capacity(ids.len());
    for root in roots {
        push_with_children(root, &mut children, &mut ordered);
    }
    // Only reachable for corrupt parent cycles.
    let stranded: Vec<Task> = children.into_values().flatten().collect();
    ordered.extend(stranded);
    ordered
}

fn push_with_children(task: Task, children: &mut HashMap<TaskId, Vec<Task>>, out: &mut Vec<Task>) {
    let subtasks = children.remove(&task.id()).unwrap_or_default();
    out.push(task);
    for subtask in subtasks {
        push_with_children(subtask, children, out);
    }
}
