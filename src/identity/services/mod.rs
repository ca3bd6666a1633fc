//! Application services for roster management.

mod roster;

pub use roster::{RosterError, RosterResult, TeamRosterService};
