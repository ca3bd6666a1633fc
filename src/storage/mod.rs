//! Storage helpers shared by the file-backed and `PostgreSQL` adapters.

mod json_file;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use json_file::{JsonFile, JsonFileError, WatchHandle, watch_file};

/// Conversion from an arbitrary backend failure into a repository error.
///
/// Every repository error enum carries a `Persistence` variant; this trait
/// lets shared helpers construct it without knowing the concrete type.
pub trait PersistenceFailure: Sized {
    /// Wraps a backend error.
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}
