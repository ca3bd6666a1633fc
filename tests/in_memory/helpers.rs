//! Shared test helpers for in-memory integration tests.

use sqtrack::app::Tracker;
use sqtrack::config::TrackerConfig;
use sqtrack::identity::domain::Actor;
use sqtrack::task::{domain::Task, services::CreateTaskRequest};

/// Target date far enough ahead that no scenario sees it as overdue.
pub const FUTURE_DATE: &str = "2099-06-30";

/// A tracker on in-memory stores together with signed-up actors.
pub struct Team {
    pub tracker: Tracker,
    pub hod: Actor,
    pub ramesh: Actor,
    pub suresh: Actor,
}

/// Opens an in-memory tracker with the default roster and signs up the
/// HOD and two members.
///
/// # Errors
///
/// Returns an error if bootstrap or sign-up fails.
pub async fn team() -> eyre::Result<Team> {
    let tracker = Tracker::open(&TrackerConfig::default()).await?;
    let identity = tracker.identity();
    let hod = identity.sign_up("Hariharan", "hod-pass", None).await?;
    let ramesh = identity.sign_up("ramesh", "ramesh-pass", None).await?;
    let suresh = identity.sign_up("Suresh", "suresh-pass", None).await?;
    Ok(Team {
        tracker,
        hod,
        ramesh,
        suresh,
    })
}

impl Team {
    /// Logs a task owned by `owner` due on [`FUTURE_DATE`].
    ///
    /// # Errors
    ///
    /// Returns an error if task creation fails.
    pub async fn task_for(&self, title: &str, owner: &str) -> eyre::Result<Task> {
        Ok(self
            .tracker
            .tasks()
            .create_task(&self.hod, CreateTaskRequest::new(title, owner, FUTURE_DATE))
            .await?)
    }

    /// Reloads a task from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the task no longer exists.
    pub async fn reload(&self, task: &Task) -> eyre::Result<Task> {
        self.tracker
            .tasks()
            .find_task(task.id())
            .await?
            .ok_or_else(|| eyre::eyre!("task {} disappeared", task.id()))
    }
}
