//! Port contracts for notification storage.

pub mod repository;

pub use repository::{
    NotificationChange, NotificationRepository, NotificationRepositoryError,
    NotificationRepositoryResult,
};
