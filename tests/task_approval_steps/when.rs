//! When steps for task approval BDD scenarios.

use super::world::{ApprovalWorld, run_async};
use rstest_bdd_macros::when;
use sqtrack::task::{domain::Task, services::TaskLifecycleError};

fn record(world: &mut ApprovalWorld, title: String, outcome: Result<Task, TaskLifecycleError>) {
    if let Ok(ref updated) = outcome {
        world.tasks.insert(title, updated.clone());
    }
    world.last_outcome = Some(outcome);
}

#[when(r#""{name}" asks to move "{title}" to "{date}" because "{reason}""#)]
fn ask_to_move(
    world: &mut ApprovalWorld,
    name: String,
    title: String,
    date: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let id = world.task(&title)?.id();
    let outcome = run_async(
        world
            .tracker()?
            .tasks()
            .request_date_change(&actor, id, &date, &reason),
    );
    record(world, title, outcome);
    Ok(())
}

#[when(r#""{name}" approves the date change on "{title}""#)]
fn approve_date_change(
    world: &mut ApprovalWorld,
    name: String,
    title: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let id = world.task(&title)?.id();
    let outcome = run_async(world.tracker()?.tasks().approve_date_change(&actor, id));
    record(world, title, outcome);
    Ok(())
}

#[when(r#""{name}" asks to close "{title}" with "{comment}""#)]
fn ask_to_close(
    world: &mut ApprovalWorld,
    name: String,
    title: String,
    comment: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let id = world.task(&title)?.id();
    let outcome = run_async(
        world
            .tracker()?
            .tasks()
            .request_closure(&actor, id, &comment),
    );
    record(world, title, outcome);
    Ok(())
}

#[when(r#""{name}" approves closing "{title}""#)]
fn approve_closing(
    world: &mut ApprovalWorld,
    name: String,
    title: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let id = world.task(&title)?.id();
    let outcome = run_async(world.tracker()?.tasks().approve_closure(&actor, id))
        .map(|approval| approval.task);
    record(world, title, outcome);
    Ok(())
}

#[when(r#""{name}" rejects closing "{title}" because "{reason}""#)]
fn reject_closing(
    world: &mut ApprovalWorld,
    name: String,
    title: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let id = world.task(&title)?.id();
    let outcome = run_async(
        world
            .tracker()?
            .tasks()
            .reject_closure(&actor, id, &reason),
    );
    record(world, title, outcome);
    Ok(())
}
