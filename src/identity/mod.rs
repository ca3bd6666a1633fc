//! Actors, roles and the team roster.
//!
//! Every lifecycle guard is expressed in terms of an [`domain::Actor`]
//! resolved by an [`ports::IdentityProvider`]. The roster of team members
//! lives behind the [`ports::TeamDirectory`] port and is used to validate
//! task owners.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Roster management in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
