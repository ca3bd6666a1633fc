//! Thread-safe in-memory task repository.

use crate::feed::{ChangeFeed, Subscription};
use crate::task::{
    adapters::{apply_write, children_of, sort_newest_first},
    domain::{Task, TaskId},
    ports::{TaskChange, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory [`TaskRepository`] for tests and the memory backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
    feed: ChangeFeed<TaskChange>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_one(&self, write: TaskWrite) -> TaskRepositoryResult<()> {
        {
            let mut tasks = self.tasks.write().map_err(lock_error)?;
            apply_write(&mut tasks, &write)?;
        }
        self.feed.publish(TaskChange::from(&write));
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_one(TaskWrite::Insert(task.clone()))
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_one(TaskWrite::Update(task.clone()))
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.write_one(TaskWrite::Delete(id))
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let mut all: Vec<Task> = {
            let tasks = self.tasks.read().map_err(lock_error)?;
            tasks.values().cloned().collect()
        };
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn find_children(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(children_of(tasks.values(), parent))
    }

    async fn apply_atomic(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()> {
        {
            let mut tasks = self.tasks.write().map_err(lock_error)?;
            let mut staged = tasks.clone();
            for write in writes {
                apply_write(&mut staged, write)?;
            }
            *tasks = staged;
        }
        for write in writes {
            self.feed.publish(TaskChange::from(write));
        }
        Ok(())
    }

    fn subscribe(&self) -> Subscription<TaskChange> {
        self.feed.subscribe()
    }
}
