//! Fixtures shared by unit tests.

use crate::identity::domain::{Actor, MemberName, Role, TeamMember, UserId};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock pinned to a settable instant.
pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pins the clock to noon UTC on the given day.
    pub(crate) fn on(year: i32, month: u32, day: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by whole days.
    pub(crate) fn advance_days(&self, days: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += chrono::Duration::days(days);
        }
    }

    /// Returns the pinned calendar day.
    pub(crate) fn today(&self) -> NaiveDate {
        self.utc().date_naive()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

/// Parses an ISO date in test code.
pub(crate) fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("test dates are ISO formatted")
}

/// Builds a member name from test input.
pub(crate) fn name(value: &str) -> MemberName {
    MemberName::new(value).expect("test member names are valid")
}

/// A team-member actor.
pub(crate) fn member(display_name: &str) -> Actor {
    Actor::new(UserId::new(), name(display_name), Role::TeamMember)
}

/// A Head of Department actor.
pub(crate) fn hod(display_name: &str) -> Actor {
    Actor::new(UserId::new(), name(display_name), Role::Hod)
}

/// Standard roster: one HOD and three assignable members, one inactive.
pub(crate) fn roster(clock: &FixedClock) -> Vec<TeamMember> {
    let mut inactive = TeamMember::new(name("Mahesh"), false, clock);
    inactive.set_active(false, clock);
    vec![
        TeamMember::new(name("Hariharan"), true, clock),
        TeamMember::new(name("alice"), false, clock),
        TeamMember::new(name("Ramesh"), false, clock),
        inactive,
    ]
}
