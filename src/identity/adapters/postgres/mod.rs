//! `PostgreSQL` adapter for the team roster.

mod directory;
mod models;
mod schema;

pub use directory::PostgresTeamDirectory;
