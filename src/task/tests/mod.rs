mod state_machine_tests;

use crate::task::domain::{Task, TaskTitle};
use crate::test_support::{FixedClock, date, name};

/// Open task due on `due`, created at the clock's current instant.
fn task(title: &str, owner: &str, due: &str, clock: &FixedClock) -> Task {
    Task::new(
        TaskTitle::new(title).expect("test titles are valid"),
        name(owner),
        date(due),
        clock,
    )
}
