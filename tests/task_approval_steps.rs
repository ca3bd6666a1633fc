//! Behaviour tests for HOD approval of task requests.

#[path = "task_approval_steps/mod.rs"]
mod task_approval_steps_defs;

use rstest_bdd_macros::scenario;
use task_approval_steps_defs::world::{ApprovalWorld, world};

#[scenario(
    path = "tests/features/task_approvals.feature",
    name = "Approving a date change moves the target date"
)]
#[tokio::test(flavor = "multi_thread")]
async fn approving_date_change(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_approvals.feature",
    name = "Rejecting a closure keeps the task open"
)]
#[tokio::test(flavor = "multi_thread")]
async fn rejecting_closure(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_approvals.feature",
    name = "A team member cannot approve their own closure"
)]
#[tokio::test(flavor = "multi_thread")]
async fn member_cannot_approve(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_approvals.feature",
    name = "A parent waiting for a subtask cannot be closed"
)]
#[tokio::test(flavor = "multi_thread")]
async fn waiting_parent_is_blocked(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_approvals.feature",
    name = "Closing the last subtask closes the parent"
)]
#[tokio::test(flavor = "multi_thread")]
async fn last_subtask_closes_parent(world: ApprovalWorld) {
    let _ = world;
}
