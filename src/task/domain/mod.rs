//! Domain model for the task lifecycle.
//!
//! The [`Task`] aggregate owns every guard: role checks go through
//! [`Actor::require_role`](crate::identity::domain::Actor::require_role),
//! ownership and state checks are made before any field changes. Dashboard
//! figures and list filters are pure projections over task slices.

mod decision;
mod error;
mod filter;
mod ids;
mod projection;
mod request;
mod schedule;
mod status;
mod task;
mod title;

pub use decision::{Decision, DecisionOutcome};
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use filter::{ParseStatusFilterError, StatusFilter, TaskFilter, hierarchical_order};
pub use ids::TaskId;
pub use projection::{ExecutionRate, MemberStats, TeamStats};
pub use request::{ClosureRequest, DateChangeRequest, RequestKind};
pub use schedule::{DATE_FORMAT, TargetDateHistory, parse_calendar_date, today};
pub use status::{TaskPhase, TaskStatus};
pub use task::{PersistedTaskData, Task};
pub use title::TaskTitle;
