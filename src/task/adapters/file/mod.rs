//! JSON document adapters for task persistence.

mod repository;

pub use repository::FileTaskRepository;
