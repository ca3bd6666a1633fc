//! sqtrack: supplier quality task tracking.
//!
//! Team members own tasks with target dates. Changing a target date or
//! closing a task needs a Head of Department's approval, and each decision
//! is delivered to the owner as a notification. Tasks may be split into
//! subtasks; a parent stays blocked until its subtasks close and closes
//! itself once the last one is approved.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and delivery
//! - **Adapters**: In-memory, JSON file and `PostgreSQL` implementations
//! - **Services**: Orchestration of domain rules over ports
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, approvals, subtasks and dashboards
//! - [`notification`]: Decision notifications and per-member inboxes
//! - [`identity`]: Actors, roles, the team roster and local accounts
//! - [`app`]: Wiring of stores and services from [`config`]

pub mod app;
pub mod config;
pub mod feed;
pub mod identity;
pub mod notification;
pub mod storage;
pub mod task;
pub mod telemetry;

#[cfg(test)]
mod test_support;
