//! Rendering of decision notifications.

use super::NotificationKind;
use crate::identity::domain::MemberName;
use crate::task::domain::{DATE_FORMAT, Decision, DecisionOutcome, TaskId};
use minijinja::{Environment, context};
use thiserror::Error;

const DATE_CHANGE_APPROVED: &str = "Your date change request for \"{{ title }}\" has been approved. New target date: {{ new_date }}";
const DATE_CHANGE_REJECTED: &str =
    "Your date change request for \"{{ title }}\" has been rejected.";
const CLOSURE_APPROVED: &str = "Your closure request for \"{{ title }}\" has been approved.";
const CLOSURE_REJECTED: &str =
    "Your closure request for \"{{ title }}\" has been rejected. Reason: {{ reason }}";

/// Error returned when a message template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render notification message: {0}")]
pub struct MessageRenderError(pub String);

/// A rendered notification not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Recipient.
    pub recipient: MemberName,
    /// Short heading.
    pub title: String,
    /// Rendered body.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
    /// Related task.
    pub task_id: Option<TaskId>,
}

/// Renders the owner notification for a decision.
///
/// Approvals are [`NotificationKind::Success`], rejections
/// [`NotificationKind::Warning`].
///
/// # Errors
///
/// Returns [`MessageRenderError`] if the template fails to render.
pub fn compose(decision: &Decision) -> Result<NotificationDraft, MessageRenderError> {
    let title = decision.task_title().as_str();
    let (heading, template, context) = match decision.outcome() {
        DecisionOutcome::DateChangeApproved { new_date } => (
            "Date Change Approved",
            DATE_CHANGE_APPROVED,
            context! { title, new_date => new_date.format(DATE_FORMAT).to_string() },
        ),
        DecisionOutcome::DateChangeRejected => {
            ("Date Change Rejected", DATE_CHANGE_REJECTED, context! { title })
        }
        DecisionOutcome::ClosureApproved => {
            ("Task Closure Approved", CLOSURE_APPROVED, context! { title })
        }
        DecisionOutcome::ClosureRejected { reason } => (
            "Task Closure Rejected",
            CLOSURE_REJECTED,
            context! { title, reason },
        ),
    };
    let message = Environment::new()
        .render_str(template, context)
        .map_err(|err| MessageRenderError(err.to_string()))?;
    let kind = if decision.outcome().is_approval() {
        NotificationKind::Success
    } else {
        NotificationKind::Warning
    };
    Ok(NotificationDraft {
        recipient: decision.owner().clone(),
        title: heading.to_owned(),
        message,
        kind,
        task_id: Some(decision.task_id()),
    })
}
