//! Shared world state for task approval BDD scenarios.

use sqtrack::app::Tracker;
use sqtrack::identity::domain::Actor;
use sqtrack::task::{domain::Task, services::TaskLifecycleError};
use rstest::fixture;
use std::collections::HashMap;

/// Scenario world for task approval behaviour tests.
#[derive(Default)]
pub struct ApprovalWorld {
    pub tracker: Option<Tracker>,
    pub actors: HashMap<String, Actor>,
    pub tasks: HashMap<String, Task>,
    pub last_outcome: Option<Result<Task, TaskLifecycleError>>,
}

impl ApprovalWorld {
    /// Returns the tracker opened by the background step.
    ///
    /// # Errors
    ///
    /// Returns an error if no tracker has been opened.
    pub fn tracker(&self) -> Result<&Tracker, eyre::Report> {
        self.tracker
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing tracker in scenario world"))
    }

    /// Returns a signed-in actor by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has not signed in.
    pub fn actor(&self, name: &str) -> Result<Actor, eyre::Report> {
        self.actors
            .get(name)
            .cloned()
            .ok_or_else(|| eyre::eyre!("'{name}' has not signed in"))
    }

    /// Returns a task created earlier in the scenario by title.
    ///
    /// # Errors
    ///
    /// Returns an error if no such task was created.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        self.tasks
            .get(title)
            .ok_or_else(|| eyre::eyre!("no task titled '{title}' in scenario world"))
    }

    /// Reloads a task from the tracker by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is unknown or lookup fails.
    pub fn reload(&self, title: &str) -> Result<Task, eyre::Report> {
        let id = self.task(title)?.id();
        run_async(self.tracker()?.tasks().find_task(id))?
            .ok_or_else(|| eyre::eyre!("task '{title}' no longer stored"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ApprovalWorld {
    ApprovalWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
