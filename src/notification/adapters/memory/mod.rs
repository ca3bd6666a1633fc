//! In-memory notification adapter.

mod repository;

pub use repository::InMemoryNotificationRepository;
