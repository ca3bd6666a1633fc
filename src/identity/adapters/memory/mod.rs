//! In-memory roster adapter.

mod directory;

pub use directory::InMemoryTeamDirectory;
