//! `PostgreSQL` adapter for notifications.

mod models;
mod repository;
mod schema;

pub use repository::PostgresNotificationRepository;
