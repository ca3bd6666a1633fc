//! Application services for the task lifecycle.

mod lifecycle;
mod requests;

pub use lifecycle::{
    ClosureApproval, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use requests::{AddSubtaskRequest, CreateTaskRequest, UpdateTaskDetailsRequest};
