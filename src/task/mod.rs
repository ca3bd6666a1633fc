//! Task lifecycle: the approval state machine at the heart of the tracker.
//!
//! Team members log tasks and ask the Head of Department to close them or
//! move their target dates. The HOD approves or rejects each request, and
//! the owner is notified of every decision. Subtasks block their parent,
//! which closes on its own once the last subtask closes. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
