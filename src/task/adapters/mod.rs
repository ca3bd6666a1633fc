//! Adapter implementations for task ports.

pub mod file;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
mod record;

pub(crate) use record::TaskRecord;

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};
use std::collections::HashMap;

/// Applies one write to a keyed task collection.
pub(crate) fn apply_write(
    tasks: &mut HashMap<TaskId, Task>,
    write: &TaskWrite,
) -> TaskRepositoryResult<()> {
    match write {
        TaskWrite::Insert(task) => {
            if tasks.contains_key(&task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
            tasks.insert(task.id(), task.clone());
        }
        TaskWrite::Update(task) => {
            let slot = tasks
                .get_mut(&task.id())
                .ok_or(TaskRepositoryError::NotFound(task.id()))?;
            *slot = task.clone();
        }
        TaskWrite::Delete(id) => {
            tasks.remove(id).ok_or(TaskRepositoryError::NotFound(*id))?;
        }
    }
    Ok(())
}

/// Sorts tasks newest first.
pub(crate) fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().into_inner().cmp(&right.id().into_inner()))
    });
}

/// Collects the subtasks of `parent`, oldest first.
pub(crate) fn children_of<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    parent: TaskId,
) -> Vec<Task> {
    let mut children: Vec<Task> = tasks
        .into_iter()
        .filter(|task| task.parent_id() == Some(parent))
        .cloned()
        .collect();
    children.sort_by_key(Task::created_at);
    children
}
