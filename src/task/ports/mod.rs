//! Port contracts for task persistence and decision delivery.

pub mod notifier;
pub mod repository;

pub use notifier::{DecisionNotifier, DecisionNotifierError};
pub use repository::{
    TaskChange, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskWrite,
};
