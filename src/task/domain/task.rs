//! Task aggregate root and its lifecycle transitions.
//!
//! Every transition takes the acting [`Actor`] and validates role, ownership
//! and state before touching any field, so a failed transition leaves the
//! task exactly as it was.

use super::{
    ClosureRequest, DateChangeRequest, Decision, DecisionOutcome, RequestKind, TargetDateHistory,
    TaskDomainError, TaskId, TaskPhase, TaskStatus, TaskTitle, today,
};
use crate::identity::domain::{Actor, MemberName, Role};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    owner: MemberName,
    notes: Option<String>,
    status: TaskStatus,
    created_on: NaiveDate,
    completed_on: Option<NaiveDate>,
    target_dates: TargetDateHistory,
    date_change: Option<DateChangeRequest>,
    date_change_approved_by: Option<MemberName>,
    closure: Option<ClosureRequest>,
    closure_approved_by: Option<MemberName>,
    closure_rejection_comment: Option<String>,
    parent_id: Option<TaskId>,
    waiting_for_subtask: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted owner name.
    pub owner: MemberName,
    /// Persisted free-text notes.
    pub notes: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Calendar day the task was logged.
    pub created_on: NaiveDate,
    /// Calendar day the task was closed.
    pub completed_on: Option<NaiveDate>,
    /// Persisted target date history.
    pub target_dates: TargetDateHistory,
    /// Pending date-change request, if any.
    pub date_change: Option<DateChangeRequest>,
    /// Approver of the latest date change.
    pub date_change_approved_by: Option<MemberName>,
    /// Pending closure request, if any.
    pub closure: Option<ClosureRequest>,
    /// Approver of the closure.
    pub closure_approved_by: Option<MemberName>,
    /// Latest closure rejection comment.
    pub closure_rejection_comment: Option<String>,
    /// Parent task for subtasks.
    pub parent_id: Option<TaskId>,
    /// Whether the task waits for open subtasks.
    pub waiting_for_subtask: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

fn required_text(value: &str, error: TaskDomainError) -> Result<String, TaskDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_owned())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl Task {
    /// Creates an open task due on `target_date`.
    ///
    /// Owner eligibility is checked against the roster by the lifecycle
    /// service before calling this.
    #[must_use]
    pub fn new(
        title: TaskTitle,
        owner: MemberName,
        target_date: NaiveDate,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title,
            owner,
            notes: None,
            status: TaskStatus::Open,
            created_on: timestamp.date_naive(),
            completed_on: None,
            target_dates: TargetDateHistory::new(target_date),
            date_change: None,
            date_change_approved_by: None,
            closure: None,
            closure_approved_by: None,
            closure_rejection_comment: None,
            parent_id: None,
            waiting_for_subtask: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Attaches free-text notes. Blank notes are dropped.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = normalize_notes(notes);
        self
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InconsistentRecord`] when the record carries
    /// a pending request on a closed task.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        if data.status == TaskStatus::Closed
            && (data.date_change.is_some() || data.closure.is_some())
        {
            return Err(TaskDomainError::InconsistentRecord(format!(
                "closed task {} has a pending request",
                data.id
            )));
        }
        Ok(Self {
            id: data.id,
            title: data.title,
            owner: data.owner,
            notes: data.notes,
            status: data.status,
            created_on: data.created_on,
            completed_on: data.completed_on,
            target_dates: data.target_dates,
            date_change: data.date_change,
            date_change_approved_by: data.date_change_approved_by,
            closure: data.closure,
            closure_approved_by: data.closure_approved_by,
            closure_rejection_comment: data.closure_rejection_comment,
            parent_id: data.parent_id,
            waiting_for_subtask: data.waiting_for_subtask,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner(&self) -> &MemberName {
        &self.owner
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the stored status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns `true` while the task is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.status, TaskStatus::Open)
    }

    /// Returns the composite lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> TaskPhase {
        if !self.is_open() {
            TaskPhase::Closed
        } else if self.waiting_for_subtask {
            TaskPhase::OpenBlocked
        } else if self.closure.is_some() {
            TaskPhase::OpenClosurePending
        } else if self.date_change.is_some() {
            TaskPhase::OpenDateChangePending
        } else {
            TaskPhase::Open
        }
    }

    /// Returns the calendar day the task was logged.
    #[must_use]
    pub const fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    /// Returns the calendar day the task was closed.
    #[must_use]
    pub const fn completed_on(&self) -> Option<NaiveDate> {
        self.completed_on
    }

    /// Returns the date the task is currently due.
    #[must_use]
    pub fn current_target_date(&self) -> NaiveDate {
        self.target_dates.current()
    }

    /// Returns the full target date history.
    #[must_use]
    pub const fn target_date_history(&self) -> &TargetDateHistory {
        &self.target_dates
    }

    /// Returns the pending date-change request, if any.
    #[must_use]
    pub const fn date_change_request(&self) -> Option<&DateChangeRequest> {
        self.date_change.as_ref()
    }

    /// Returns `true` while a date change awaits a decision.
    #[must_use]
    pub const fn is_date_change_pending(&self) -> bool {
        self.date_change.is_some()
    }

    /// Returns who approved the latest date change.
    #[must_use]
    pub const fn date_change_approved_by(&self) -> Option<&MemberName> {
        self.date_change_approved_by.as_ref()
    }

    /// Returns the pending closure request, if any.
    #[must_use]
    pub const fn closure_request(&self) -> Option<&ClosureRequest> {
        self.closure.as_ref()
    }

    /// Returns `true` while a closure awaits a decision.
    #[must_use]
    pub const fn is_closure_pending(&self) -> bool {
        self.closure.is_some()
    }

    /// Returns who approved the closure.
    #[must_use]
    pub const fn closure_approved_by(&self) -> Option<&MemberName> {
        self.closure_approved_by.as_ref()
    }

    /// Returns the latest closure rejection comment.
    #[must_use]
    pub fn closure_rejection_comment(&self) -> Option<&str> {
        self.closure_rejection_comment.as_deref()
    }

    /// Returns the parent task for subtasks.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns `true` for subtasks.
    #[must_use]
    pub const fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Returns `true` while the task waits for open subtasks.
    #[must_use]
    pub const fn is_waiting_for_subtask(&self) -> bool {
        self.waiting_for_subtask
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Counts toward overdue: open, not waiting, and past its target date.
    #[must_use]
    pub fn is_overdue(&self, on: NaiveDate) -> bool {
        self.counts_toward_deadlines() && self.current_target_date() < on
    }

    /// Counts toward due today: open, not waiting, and due on `on`.
    #[must_use]
    pub fn is_due_today(&self, on: NaiveDate) -> bool {
        self.counts_toward_deadlines() && self.current_target_date() == on
    }

    /// Missed its deadline: open past due, or closed after the target date.
    #[must_use]
    pub fn has_slipped(&self, on: NaiveDate) -> bool {
        match self.completed_on {
            Some(completed) if !self.is_open() => completed > self.current_target_date(),
            _ => self.is_open() && self.current_target_date() < on,
        }
    }

    const fn counts_toward_deadlines(&self) -> bool {
        self.is_open() && !self.waiting_for_subtask
    }

    /// Asks the HOD to move the target date.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, [`TaskDomainError::TaskClosed`],
    /// [`TaskDomainError::AlreadyPending`], [`TaskDomainError::NotOwner`] or
    /// [`TaskDomainError::EmptyReason`].
    pub fn request_date_change(
        &mut self,
        actor: &Actor,
        new_date: NaiveDate,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_open()?;
        if self.date_change.is_some() {
            return Err(self.already_pending(RequestKind::DateChange));
        }
        self.require_owner(actor)?;
        let reason_text = required_text(reason, TaskDomainError::EmptyReason)?;
        self.date_change = Some(DateChangeRequest::new(new_date, reason_text));
        self.touch(clock);
        Ok(())
    }

    /// Approves the pending date change, appending the new date to the
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors and
    /// [`TaskDomainError::NotPending`] when no date change is pending.
    pub fn approve_date_change(
        &mut self,
        approver: &Actor,
        clock: &impl Clock,
    ) -> Result<Decision, TaskDomainError> {
        approver.require_role(Role::Hod)?;
        let request = self
            .date_change
            .take()
            .ok_or_else(|| self.not_pending(RequestKind::DateChange))?;
        let new_date = request.requested_date();
        self.target_dates.record_move(new_date);
        self.date_change_approved_by = Some(approver.display_name().clone());
        self.touch(clock);
        Ok(self.decision(approver, DecisionOutcome::DateChangeApproved { new_date }))
    }

    /// Rejects the pending date change. The history is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors and
    /// [`TaskDomainError::NotPending`] when no date change is pending.
    pub fn reject_date_change(
        &mut self,
        approver: &Actor,
        clock: &impl Clock,
    ) -> Result<Decision, TaskDomainError> {
        approver.require_role(Role::Hod)?;
        if self.date_change.take().is_none() {
            return Err(self.not_pending(RequestKind::DateChange));
        }
        self.touch(clock);
        Ok(self.decision(approver, DecisionOutcome::DateChangeRejected))
    }

    /// Asks the HOD to close the task.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, [`TaskDomainError::TaskClosed`],
    /// [`TaskDomainError::Blocked`] (for any role),
    /// [`TaskDomainError::AlreadyPending`], [`TaskDomainError::NotOwner`] or
    /// [`TaskDomainError::EmptyComment`].
    pub fn request_closure(
        &mut self,
        actor: &Actor,
        comment: &str,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_open()?;
        if self.waiting_for_subtask {
            return Err(TaskDomainError::Blocked(self.id));
        }
        if self.closure.is_some() {
            return Err(self.already_pending(RequestKind::Closure));
        }
        self.require_owner(actor)?;
        let comment_text = required_text(comment, TaskDomainError::EmptyComment)?;
        self.closure = Some(ClosureRequest::new(
            comment_text,
            actor.display_name().clone(),
        ));
        self.touch(clock);
        Ok(())
    }

    /// Approves the pending closure and closes the task today.
    ///
    /// Any date change still pending is dropped with it. Parent
    /// re-evaluation is the lifecycle service's job.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors and
    /// [`TaskDomainError::NotPending`] when no closure is pending.
    pub fn approve_closure(
        &mut self,
        approver: &Actor,
        clock: &impl Clock,
    ) -> Result<Decision, TaskDomainError> {
        approver.require_role(Role::Hod)?;
        if self.closure.take().is_none() {
            return Err(self.not_pending(RequestKind::Closure));
        }
        self.close(clock);
        self.closure_approved_by = Some(approver.display_name().clone());
        self.closure_rejection_comment = None;
        Ok(self.decision(approver, DecisionOutcome::ClosureApproved))
    }

    /// Rejects the pending closure, recording the reason for the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors,
    /// [`TaskDomainError::NotPending`] when no closure is pending, and
    /// [`TaskDomainError::EmptyComment`] for a blank reason.
    pub fn reject_closure(
        &mut self,
        approver: &Actor,
        rejection_comment: &str,
        clock: &impl Clock,
    ) -> Result<Decision, TaskDomainError> {
        approver.require_role(Role::Hod)?;
        if self.closure.is_none() {
            return Err(self.not_pending(RequestKind::Closure));
        }
        let reason = required_text(rejection_comment, TaskDomainError::EmptyComment)?;
        self.closure = None;
        self.closure_rejection_comment = Some(reason.clone());
        self.touch(clock);
        Ok(self.decision(approver, DecisionOutcome::ClosureRejected { reason }))
    }

    /// Creates a subtask under this task and blocks it until the subtask
    /// closes. A closure request in flight on this task is withdrawn.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Forbidden`] for non-HOD actors,
    /// [`TaskDomainError::TaskClosed`] when this task is closed and
    /// [`TaskDomainError::NestedSubtask`] when this task is itself a subtask.
    pub fn spawn_subtask(
        &mut self,
        actor: &Actor,
        title: TaskTitle,
        owner: MemberName,
        target_date: NaiveDate,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        actor.require_role(Role::Hod)?;
        self.require_open()?;
        if self.parent_id.is_some() {
            return Err(TaskDomainError::NestedSubtask(self.id));
        }
        let mut subtask = Self::new(title, owner, target_date, clock);
        subtask.parent_id = Some(self.id);
        self.waiting_for_subtask = true;
        self.closure = None;
        self.touch(clock);
        Ok(subtask)
    }

    /// Edits the title and notes. Target dates only move through approved
    /// date changes.
    ///
    /// `notes` of `Some("")` clears the notes; `None` leaves them unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskClosed`] for closed tasks and
    /// [`TaskDomainError::NotOwner`] unless the actor owns the task or is a
    /// Head of Department.
    pub fn update_details(
        &mut self,
        actor: &Actor,
        title: Option<TaskTitle>,
        notes: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_open()?;
        if !actor.is_hod() {
            self.require_owner(actor)?;
        }
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_notes) = notes {
            self.notes = normalize_notes(Some(new_notes));
        }
        self.touch(clock);
        Ok(())
    }

    /// Closes a parent whose subtasks are all closed.
    ///
    /// Returns `false` when the task was already closed.
    pub(crate) fn close_after_subtasks(&mut self, clock: &impl Clock) -> bool {
        if !self.is_open() {
            return false;
        }
        self.closure = None;
        self.close(clock);
        true
    }

    /// Clears the subtask block after the last subtask was deleted.
    pub(crate) fn release_subtask_block(&mut self, clock: &impl Clock) {
        if self.waiting_for_subtask {
            self.waiting_for_subtask = false;
            self.touch(clock);
        }
    }

    fn close(&mut self, clock: &impl Clock) {
        self.status = TaskStatus::Closed;
        self.completed_on = Some(today(clock));
        self.waiting_for_subtask = false;
        self.date_change = None;
        self.touch(clock);
    }

    fn require_open(&self) -> Result<(), TaskDomainError> {
        if self.is_open() {
            return Ok(());
        }
        Err(TaskDomainError::TaskClosed(self.id))
    }

    fn require_owner(&self, actor: &Actor) -> Result<(), TaskDomainError> {
        if actor.is(&self.owner) {
            return Ok(());
        }
        Err(TaskDomainError::NotOwner {
            task_id: self.id,
            actor: actor.display_name().clone(),
            owner: self.owner.clone(),
        })
    }

    const fn not_pending(&self, kind: RequestKind) -> TaskDomainError {
        TaskDomainError::NotPending {
            task_id: self.id,
            kind,
        }
    }

    const fn already_pending(&self, kind: RequestKind) -> TaskDomainError {
        TaskDomainError::AlreadyPending {
            task_id: self.id,
            kind,
        }
    }

    fn decision(&self, approver: &Actor, outcome: DecisionOutcome) -> Decision {
        Decision::new(
            self.id,
            self.title.clone(),
            self.owner.clone(),
            approver.display_name().clone(),
            outcome,
        )
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
