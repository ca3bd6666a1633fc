//! Port through which HOD decisions reach the task owner.

use crate::task::domain::Decision;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Delivers the owner notification for a decision.
#[async_trait]
pub trait DecisionNotifier: Send + Sync {
    /// Records one notification for the decision's task owner.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionNotifierError`] when the notification could not be
    /// stored.
    async fn notify(&self, decision: &Decision) -> Result<(), DecisionNotifierError>;
}

/// Error returned when a decision notification cannot be delivered.
#[derive(Debug, Clone, Error)]
#[error("notification delivery failed: {0}")]
pub struct DecisionNotifierError(pub Arc<dyn std::error::Error + Send + Sync>);

impl DecisionNotifierError {
    /// Wraps the underlying failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
