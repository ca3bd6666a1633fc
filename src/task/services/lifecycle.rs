//! Service layer orchestrating task lifecycle operations.
//!
//! Each operation loads the task, applies the domain transition (which
//! checks role, ownership and state), writes the result back and, for HOD
//! decisions, notifies the task owner. Writes touching two tasks go through
//! [`TaskRepository::apply_atomic`].

use super::{AddSubtaskRequest, CreateTaskRequest, UpdateTaskDetailsRequest};
use crate::feed::Subscription;
use crate::identity::{
    domain::{Actor, MemberName, Role},
    ports::{TeamDirectory, TeamDirectoryError},
};
use crate::task::{
    domain::{
        Decision, MemberStats, Task, TaskDomainError, TaskFilter, TaskId, TaskTitle, TeamStats,
        hierarchical_order, parse_calendar_date, today,
    },
    ports::{DecisionNotifier, TaskChange, TaskRepository, TaskRepositoryError, TaskWrite},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A guard or validation rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The parent task does not exist.
    #[error("parent task not found: {0}")]
    ParentNotFound(TaskId),
    /// Owner lookup failed.
    #[error(transparent)]
    Directory(#[from] TeamDirectoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Outcome of an approved closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureApproval {
    /// The task that was closed.
    pub task: Task,
    /// The parent, when the approval closed its last open subtask.
    pub parent_closed: Option<Task>,
}

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, N, D, C>
where
    R: TaskRepository + ?Sized,
    N: DecisionNotifier + ?Sized,
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, N, D, C> Clone for TaskLifecycleService<R, N, D, C>
where
    R: TaskRepository + ?Sized,
    N: DecisionNotifier + ?Sized,
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
            directory: Arc::clone(&self.directory),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, N, D, C> TaskLifecycleService<R, N, D, C>
where
    R: TaskRepository + ?Sized,
    N: DecisionNotifier + ?Sized,
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifier: Arc<N>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifier,
            directory,
            clock,
        }
    }

    /// Logs a new top-level task.
    ///
    /// The owner must be an active, non-HOD roster member; the roster
    /// spelling of the name is stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty title, a malformed
    /// date or an ineligible owner, or a repository error.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(request.title)?;
        let target_date = parse_calendar_date(&request.target_date)?;
        let owner = self.assignable_owner(&request.owner).await?;
        let task = Task::new(title, owner, target_date, &*self.clock).with_notes(request.notes);
        self.repository.store(&task).await?;
        info!(
            task_id = %task.id(),
            owner = %task.owner(),
            by = %actor.display_name(),
            "task created"
        );
        Ok(task)
    }

    /// Splits a subtask off an open task. HOD only.
    ///
    /// The parent is blocked until every subtask closes and any closure
    /// request on it is withdrawn. Both writes are applied atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors,
    /// [`TaskLifecycleError::ParentNotFound`], [`TaskDomainError::TaskClosed`]
    /// for a closed parent, [`TaskDomainError::NestedSubtask`] when the parent
    /// is itself a subtask, validation errors, or a repository error.
    pub async fn add_subtask(
        &self,
        actor: &Actor,
        request: AddSubtaskRequest,
    ) -> TaskLifecycleResult<Task> {
        actor
            .require_role(Role::Hod)
            .map_err(TaskDomainError::from)?;
        let mut parent = self
            .repository
            .find_by_id(request.parent_id)
            .await?
            .ok_or(TaskLifecycleError::ParentNotFound(request.parent_id))?;
        let title = TaskTitle::new(request.title)?;
        let target_date = parse_calendar_date(&request.target_date)?;
        let owner = self.assignable_owner(&request.owner).await?;

        let subtask = parent.spawn_subtask(actor, title, owner, target_date, &*self.clock)?;
        self.repository
            .apply_atomic(&[
                TaskWrite::Insert(subtask.clone()),
                TaskWrite::Update(parent),
            ])
            .await?;
        info!(
            task_id = %subtask.id(),
            parent_id = %request.parent_id,
            owner = %subtask.owner(),
            "subtask added"
        );
        Ok(subtask)
    }

    /// Asks the HOD to move a task's target date. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskDomainError::InvalidDate`], a lifecycle guard error, or a
    /// repository error.
    pub async fn request_date_change(
        &self,
        actor: &Actor,
        task_id: TaskId,
        new_date: &str,
        reason: &str,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        let requested = parse_calendar_date(new_date)?;
        task.request_date_change(actor, requested, reason, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task_id, requested = %requested, "date change requested");
        Ok(task)
    }

    /// Approves a pending date change and notifies the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskDomainError::Forbidden`], [`TaskDomainError::NotPending`], or a
    /// repository error.
    pub async fn approve_date_change(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        let decision = task.approve_date_change(actor, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(
            task_id = %task_id,
            target_date = %task.current_target_date(),
            by = %actor.display_name(),
            "date change approved"
        );
        self.notify_owner(&decision).await;
        Ok(task)
    }

    /// Rejects a pending date change and notifies the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskDomainError::Forbidden`], [`TaskDomainError::NotPending`], or a
    /// repository error.
    pub async fn reject_date_change(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        let decision = task.reject_date_change(actor, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task_id, by = %actor.display_name(), "date change rejected");
        self.notify_owner(&decision).await;
        Ok(task)
    }

    /// Asks the HOD to close a task. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`], a lifecycle guard error
    /// such as [`TaskDomainError::Blocked`], or a repository error.
    pub async fn request_closure(
        &self,
        actor: &Actor,
        task_id: TaskId,
        comment: &str,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        task.request_closure(actor, comment, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task_id, by = %actor.display_name(), "closure requested");
        Ok(task)
    }

    /// Approves a pending closure and notifies the owner.
    ///
    /// When this closes the last open subtask, the parent is closed in the
    /// same atomic batch. Once the batch commits the stored siblings are read
    /// again, so a parent whose last two subtasks were approved concurrently
    /// still closes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskDomainError::Forbidden`], [`TaskDomainError::NotPending`], or a
    /// repository error.
    pub async fn approve_closure(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskLifecycleResult<ClosureApproval> {
        let mut task = self.load(task_id).await?;
        let decision = task.approve_closure(actor, &*self.clock)?;
        let closed_in_batch = match task.parent_id() {
            Some(parent_id) => self.close_parent_if_done(parent_id, &task).await?,
            None => None,
        };

        let mut writes = vec![TaskWrite::Update(task.clone())];
        writes.extend(closed_in_batch.iter().cloned().map(TaskWrite::Update));
        self.repository.apply_atomic(&writes).await?;
        let parent_closed = match (closed_in_batch, task.parent_id()) {
            (None, Some(parent_id)) => self.settle_parent(parent_id).await?,
            (closed, _) => closed,
        };
        info!(task_id = %task_id, by = %actor.display_name(), "closure approved");
        if let Some(parent) = &parent_closed {
            info!(task_id = %parent.id(), "parent closed after its last subtask");
        }
        self.notify_owner(&decision).await;
        Ok(ClosureApproval {
            task,
            parent_closed,
        })
    }

    /// Rejects a pending closure with a reason and notifies the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskDomainError::Forbidden`], [`TaskDomainError::NotPending`],
    /// [`TaskDomainError::EmptyComment`], or a repository error.
    pub async fn reject_closure(
        &self,
        actor: &Actor,
        task_id: TaskId,
        rejection_comment: &str,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        let decision = task.reject_closure(actor, rejection_comment, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task_id, by = %actor.display_name(), "closure rejected");
        self.notify_owner(&decision).await;
        Ok(task)
    }

    /// Edits a task's title or notes. Owner or HOD.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`], a guard or validation
    /// error, or a repository error.
    pub async fn update_details(
        &self,
        actor: &Actor,
        task_id: TaskId,
        request: UpdateTaskDetailsRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        let title = request.title.map(TaskTitle::new).transpose()?;
        task.update_details(actor, title, request.notes, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task_id, by = %actor.display_name(), "task details updated");
        Ok(task)
    }

    /// Deletes a task and all of its subtasks. HOD only.
    ///
    /// Deleting a subtask re-evaluates its parent: with no subtasks left the
    /// parent is unblocked, and with only closed subtasks left it closes.
    /// Returns the identifiers of every deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors,
    /// [`TaskLifecycleError::TaskNotFound`], or a repository error.
    pub async fn delete_task(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<TaskId>> {
        actor
            .require_role(Role::Hod)
            .map_err(TaskDomainError::from)?;
        let task = self.load(task_id).await?;
        let deleted = self.subtree_ids(task_id).await?;

        let mut writes: Vec<TaskWrite> = deleted.iter().copied().map(TaskWrite::Delete).collect();
        if let Some(parent_id) = task.parent_id() {
            if let Some(parent) = self.reevaluate_parent(parent_id, task_id).await? {
                writes.push(TaskWrite::Update(parent));
            }
        }
        self.repository.apply_atomic(&writes).await?;
        if let Some(parent_id) = task.parent_id() {
            self.settle_parent(parent_id).await?;
        }
        info!(
            task_id = %task_id,
            deleted = deleted.len(),
            by = %actor.display_name(),
            "task deleted"
        );
        Ok(deleted)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Lists tasks matching `filter`, each top-level task followed by its
    /// subtasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> TaskLifecycleResult<Vec<Task>> {
        let all = self.repository.find_all().await?;
        let matching = filter.apply(all, today(&*self.clock));
        debug!(count = matching.len(), "tasks listed");
        Ok(hierarchical_order(matching))
    }

    /// Computes the personal dashboard for `member`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn member_stats(&self, member: &MemberName) -> TaskLifecycleResult<MemberStats> {
        let all = self.repository.find_all().await?;
        Ok(MemberStats::for_member(&all, member, today(&*self.clock)))
    }

    /// Computes the department dashboard. HOD only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors or
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn team_stats(&self, actor: &Actor) -> TaskLifecycleResult<TeamStats> {
        actor
            .require_role(Role::Hod)
            .map_err(TaskDomainError::from)?;
        let all = self.repository.find_all().await?;
        Ok(TeamStats::from_tasks(&all, today(&*self.clock)))
    }

    /// Subscribes to task changes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<TaskChange> {
        self.repository.subscribe()
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn assignable_owner(&self, owner: &str) -> TaskLifecycleResult<MemberName> {
        match self.directory.find_by_name(owner).await? {
            Some(member) if member.is_assignable() => Ok(member.name().clone()),
            _ => Err(TaskDomainError::OwnerNotAssignable(owner.trim().to_owned()).into()),
        }
    }

    /// Returns the closed parent when every subtask, counting `closed_child`
    /// as closed, is now closed.
    async fn close_parent_if_done(
        &self,
        parent_id: TaskId,
        closed_child: &Task,
    ) -> TaskLifecycleResult<Option<Task>> {
        let siblings = self.repository.find_children(parent_id).await?;
        let all_closed = siblings
            .iter()
            .all(|sibling| sibling.id() == closed_child.id() || !sibling.is_open());
        if !all_closed {
            return Ok(None);
        }
        let Some(mut parent) = self.repository.find_by_id(parent_id).await? else {
            warn!(task_id = %closed_child.id(), parent_id = %parent_id, "subtask parent is missing");
            return Ok(None);
        };
        Ok(parent
            .close_after_subtasks(&*self.clock)
            .then_some(parent))
    }

    /// Closes a blocked parent whose stored subtasks are all closed.
    ///
    /// Runs after the approval batch commits and sees sibling approvals that
    /// committed in the meantime.
    async fn settle_parent(&self, parent_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        let children = self.repository.find_children(parent_id).await?;
        if children.is_empty() || children.iter().any(Task::is_open) {
            return Ok(None);
        }
        let Some(mut parent) = self.repository.find_by_id(parent_id).await? else {
            return Ok(None);
        };
        if !parent.is_waiting_for_subtask() || !parent.close_after_subtasks(&*self.clock) {
            return Ok(None);
        }
        self.repository.update(&parent).await?;
        Ok(Some(parent))
    }

    /// Returns the updated parent after `removed` is deleted, or `None` when
    /// the parent needs no change.
    async fn reevaluate_parent(
        &self,
        parent_id: TaskId,
        removed: TaskId,
    ) -> TaskLifecycleResult<Option<Task>> {
        let Some(mut parent) = self.repository.find_by_id(parent_id).await? else {
            return Ok(None);
        };
        let before = parent.clone();
        let remaining: Vec<Task> = self
            .repository
            .find_children(parent_id)
            .await?
            .into_iter()
            .filter(|child| child.id() != removed)
            .collect();
        if remaining.is_empty() {
            parent.release_subtask_block(&*self.clock);
        } else if remaining.iter().all(|child| !child.is_open()) {
            parent.close_after_subtasks(&*self.clock);
        }
        Ok((parent != before).then_some(parent))
    }

    /// Collects `root` and every task below it, deepest first.
    async fn subtree_ids(&self, root: TaskId) -> TaskLifecycleResult<Vec<TaskId>> {
        let mut pending = vec![root];
        let mut collected = Vec::new();
        while let Some(current) = pending.pop() {
            collected.push(current);
            let children = self.repository.find_children(current).await?;
            pending.extend(children.iter().map(Task::id));
        }
        collected.reverse();
        Ok(collected)
    }

    async fn notify_owner(&self, decision: &Decision) {
        if let Err(err) = self.notifier.notify(decision).await {
            warn!(
                task_id = %decision.task_id(),
                owner = %decision.owner(),
                error = %err,
                "decision saved but owner notification failed"
            );
        }
    }
}
