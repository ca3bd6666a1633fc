//! Unit tests for roster management.

use std::sync::Arc;

use crate::identity::{
    adapters::memory::InMemoryTeamDirectory,
    ports::TeamDirectoryError,
    services::{RosterError, TeamRosterService},
};
use crate::test_support::{FixedClock, hod, member};
use rstest::{fixture, rstest};

type TestRoster = TeamRosterService<InMemoryTeamDirectory, FixedClock>;

#[fixture]
fn roster_service() -> TestRoster {
    TeamRosterService::new(
        Arc::new(InMemoryTeamDirectory::new()),
        Arc::new(FixedClock::on(2025, 1, 6)),
    )
}

#[rstest]
#[tokio::test]
async fn hod_adds_and_lists_members(roster_service: TestRoster) -> eyre::Result<()> {
    let head = hod("Hariharan");
    roster_service.add_member(&head, "Suresh", false).await?;
    roster_service.add_member(&head, "anand", false).await?;

    let names: Vec<String> = roster_service
        .members()
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(names, vec!["anand".to_owned(), "Suresh".to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn team_member_cannot_manage_roster(roster_service: TestRoster) {
    let result = roster_service.add_member(&member("alice"), "Bob", false).await;
    assert!(matches!(result, Err(RosterError::Forbidden(_))));
}

#[rstest]
#[tokio::test]
async fn duplicate_names_are_rejected_ignoring_case(roster_service: TestRoster) -> eyre::Result<()> {
    let head = hod("Hariharan");
    roster_service.add_member(&head, "Suresh", false).await?;
    let result = roster_service.add_member(&head, "SURESH", false).await;
    assert!(matches!(
        result,
        Err(RosterError::Directory(TeamDirectoryError::DuplicateName(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn assignable_members_exclude_inactive_and_hod(roster_service: TestRoster) -> eyre::Result<()> {
    let head = hod("Hariharan");
    roster_service.add_member(&head, "Hariharan", true).await?;
    let suresh = roster_service.add_member(&head, "Suresh", false).await?;
    roster_service.add_member(&head, "Ganesh", false).await?;
    roster_service.set_active(&head, suresh.id(), false).await?;

    let assignable: Vec<String> = roster_service
        .assignable_members()
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(assignable, vec!["Ganesh".to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn rename_and_remove_update_the_directory(roster_service: TestRoster) -> eyre::Result<()> {
    let head = hod("Hariharan");
    let ganesh = roster_service.add_member(&head, "Ganesh", false).await?;
    let renamed = roster_service.rename_member(&head, ganesh.id(), "Ganesh K").await?;
    assert_eq!(renamed.name().as_str(), "Ganesh K");

    roster_service.remove_member(&head, ganesh.id()).await?;
    assert!(roster_service.members().await?.is_empty());
    let missing = roster_service.remove_member(&head, ganesh.id()).await;
    assert!(matches!(
        missing,
        Err(RosterError::Directory(TeamDirectoryError::NotFound(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn seeding_only_fills_an_empty_roster(roster_service: TestRoster) -> eyre::Result<()> {
    let seed = vec![("Hariharan".to_owned(), true), ("Ramesh".to_owned(), false)];
    assert_eq!(roster_service.seed_if_empty(seed.clone()).await?, 2);
    assert_eq!(roster_service.seed_if_empty(seed).await?, 0);
    assert_eq!(roster_service.members().await?.len(), 2);
    Ok(())
}
