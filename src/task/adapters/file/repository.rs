//! Task collection persisted as a single JSON document.

use crate::feed::{ChangeFeed, Subscription};
use crate::storage::{JsonFile, JsonFileError, WatchHandle, watch_file};
use crate::task::{
    adapters::{TaskRecord, apply_write, children_of, sort_newest_first},
    domain::{Task, TaskId},
    ports::{TaskChange, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Document file holding every task.
const TASKS_FILE: &str = "tasks.json";

/// [`TaskRepository`] stored in `tasks.json` inside a data directory.
///
/// Writes within this process are serialised; concurrent writers in other
/// processes are last-write-wins.
#[derive(Debug)]
pub struct FileTaskRepository {
    file: Arc<JsonFile<Vec<TaskRecord>>>,
    write_lock: Mutex<()>,
    feed: ChangeFeed<TaskChange>,
}

impl FileTaskRepository {
    /// Opens the task document inside `data_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the directory cannot be opened.
    pub fn open(data_dir: &str) -> Result<Self, JsonFileError> {
        Ok(Self {
            file: Arc::new(JsonFile::open(data_dir, TASKS_FILE)?),
            write_lock: Mutex::new(()),
            feed: ChangeFeed::new(),
        })
    }

    /// Polls the document and announces [`TaskChange::Reloaded`] whenever it
    /// changes on disk, including writes made by other processes.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the handle stops the watcher"]
    pub fn watch_external_changes(&self, interval: Duration) -> WatchHandle {
        let feed = self.feed.clone();
        watch_file(Arc::clone(&self.file), interval, move || {
            feed.publish(TaskChange::Reloaded);
        })
    }

    fn load(&self) -> TaskRepositoryResult<HashMap<TaskId, Task>> {
        let records = self.file.load().map_err(TaskRepositoryError::persistence)?;
        records
            .into_iter()
            .map(|record| {
                record
                    .into_task()
                    .map(|task| (task.id(), task))
                    .map_err(TaskRepositoryError::persistence)
            })
            .collect()
    }

    fn save(&self, tasks: HashMap<TaskId, Task>) -> TaskRepositoryResult<()> {
        let mut ordered: Vec<Task> = tasks.into_values().collect();
        sort_newest_first(&mut ordered);
        let records: Vec<TaskRecord> = ordered.iter().map(TaskRecord::from).collect();
        self.file
            .save(&records)
            .map_err(TaskRepositoryError::persistence)?;
        debug!(tasks = records.len(), file = self.file.name(), "task document saved");
        Ok(())
    }

    async fn write_batch(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()> {
        {
            let _guard = self.write_lock.lock().await;
            let mut tasks = self.load()?;
            for write in writes {
                apply_write(&mut tasks, write)?;
            }
            self.save(tasks)?;
        }
        for write in writes {
            self.feed.publish(TaskChange::from(write));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Insert(task.clone())]).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Update(task.clone())]).await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.write_batch(&[TaskWrite::Delete(id)]).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.load()?.remove(&id))
    }

    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let mut all: Vec<Task> = self.load()?.into_values().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn find_children(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        Ok(children_of(self.load()?.values(), parent))
    }

    async fn apply_atomic(&self, writes: &[TaskWrite]) -> TaskRepositoryResult<()> {
        self.write_batch(writes).await
    }

    fn subscribe(&self) -> Subscription<TaskChange> {
        self.feed.subscribe()
    }
}
