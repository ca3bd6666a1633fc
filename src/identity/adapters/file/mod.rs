//! JSON file roster adapter.

mod directory;

pub use directory::FileTeamDirectory;
