//! Outcome of a Head of Department decision.

use super::{TaskId, TaskTitle};
use crate::identity::domain::MemberName;
use chrono::NaiveDate;

/// What the HOD decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The date change was approved and the target date moved.
    DateChangeApproved {
        /// The new target date.
        new_date: NaiveDate,
    },
    /// The date change was rejected.
    DateChangeRejected,
    /// The closure was approved and the task closed.
    ClosureApproved,
    /// The closure was rejected.
    ClosureRejected {
        /// Rejection comment recorded on the task.
        reason: String,
    },
}

impl DecisionOutcome {
    /// Returns `true` for approvals.
    #[must_use]
    pub const fn is_approval(&self) -> bool {
        matches!(
            self,
            Self::DateChangeApproved { .. } | Self::ClosureApproved
        )
    }
}

/// A decision applied to a task, carrying what the owner needs to be told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    task_id: TaskId,
    task_title: TaskTitle,
    owner: MemberName,
    decided_by: MemberName,
    outcome: DecisionOutcome,
}

impl Decision {
    pub(crate) const fn new(
        task_id: TaskId,
        task_title: TaskTitle,
        owner: MemberName,
        decided_by: MemberName,
        outcome: DecisionOutcome,
    ) -> Self {
        Self {
            task_id,
            task_title,
            owner,
            decided_by,
            outcome,
        }
    }

    /// Returns the decided task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task title at decision time.
    #[must_use]
    pub const fn task_title(&self) -> &TaskTitle {
        &self.task_title
    }

    /// Returns the task owner, who receives the notification.
    #[must_use]
    pub const fn owner(&self) -> &MemberName {
        &self.owner
    }

    /// Returns the approver.
    #[must_use]
    pub const fn decided_by(&self) -> &MemberName {
        &self.decided_by
    }

    /// Returns the outcome.
    #[must_use]
    pub const fn outcome(&self) -> &DecisionOutcome {
        &self.outcome
    }
}
