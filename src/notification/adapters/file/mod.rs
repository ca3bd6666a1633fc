//! JSON file notification adapter.

mod repository;

pub use repository::FileNotificationRepository;
