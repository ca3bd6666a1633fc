//! Per-user notifications raised by Head of Department decisions.
//!
//! Every approval or rejection produces exactly one notification for the
//! task owner. Inboxes keep a bounded number of the most recent entries.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Dispatch and inbox services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
