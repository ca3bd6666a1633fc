//! Given steps for task approval BDD scenarios.

use super::world::{ApprovalWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use sqtrack::app::Tracker;
use sqtrack::config::TrackerConfig;
use sqtrack::task::services::{AddSubtaskRequest, CreateTaskRequest};

#[given("a tracker with the default roster")]
fn tracker_with_default_roster(world: &mut ApprovalWorld) -> Result<(), eyre::Report> {
    let tracker =
        run_async(Tracker::open(&TrackerConfig::default())).wrap_err("open in-memory tracker")?;
    world.tracker = Some(tracker);
    Ok(())
}

#[given(r#""{name}" has signed in"#)]
fn member_signed_in(world: &mut ApprovalWorld, name: String) -> Result<(), eyre::Report> {
    let identity = world.tracker()?.identity();
    let actor = run_async(identity.sign_up(&name, "scenario-password", None))
        .wrap_err_with(|| format!("sign up '{name}'"))?;
    world.actors.insert(name, actor);
    Ok(())
}

#[given(r#"a task "{title}" owned by "{owner}" due "{due}""#)]
fn task_owned_by(
    world: &mut ApprovalWorld,
    title: String,
    owner: String,
    due: String,
) -> Result<(), eyre::Report> {
    let hod = world.actor("Hariharan")?;
    let task = run_async(
        world
            .tracker()?
            .tasks()
            .create_task(&hod, CreateTaskRequest::new(title.as_str(), owner, due)),
    )
    .wrap_err("create task for scenario")?;
    world.tasks.insert(title, task);
    Ok(())
}

#[given(r#"a subtask "{title}" of "{parent}" owned by "{owner}" due "{due}""#)]
fn subtask_of(
    world: &mut ApprovalWorld,
    title: String,
    parent: String,
    owner: String,
    due: String,
) -> Result<(), eyre::Report> {
    let hod = world.actor("Hariharan")?;
    let parent_id = world.task(&parent)?.id();
    let subtask = run_async(world.tracker()?.tasks().add_subtask(
        &hod,
        AddSubtaskRequest::new(parent_id, title.as_str(), owner, due),
    ))
    .wrap_err("add subtask for scenario")?;
    world.tasks.insert(title, subtask);
    Ok(())
}
