//! Target dates and their append-only history.

use super::TaskDomainError;
use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Storage and wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidDate`] for empty or malformed input.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, TaskDomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| TaskDomainError::InvalidDate(value.to_owned()))
}

/// Returns the current calendar day. Days are reckoned in UTC.
#[must_use]
pub fn today(clock: &impl Clock) -> NaiveDate {
    clock.utc().date_naive()
}

/// Ordered record of every target date a task has had.
///
/// The first entry is the original target date. Each approved date change
/// appends one entry, so the current target date is always the last one.
/// Entries are never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct TargetDateHistory {
    original: NaiveDate,
    moves: Vec<NaiveDate>,
}

impl TargetDateHistory {
    /// Starts a history at the original target date.
    #[must_use]
    pub const fn new(original: NaiveDate) -> Self {
        Self {
            original,
            moves: Vec::new(),
        }
    }

    /// Rebuilds a history from stored dates, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InconsistentRecord`] when `dates` is empty.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Result<Self, TaskDomainError> {
        let mut iter = dates.into_iter();
        let original = iter.next().ok_or_else(|| {
            TaskDomainError::InconsistentRecord("target date history is empty".to_owned())
        })?;
        Ok(Self {
            original,
            moves: iter.collect(),
        })
    }

    /// Returns the date the task was first due.
    #[must_use]
    pub const fn original(&self) -> NaiveDate {
        self.original
    }

    /// Returns the date the task is currently due.
    #[must_use]
    pub fn current(&self) -> NaiveDate {
        self.moves.last().copied().unwrap_or(self.original)
    }

    /// Returns how many date changes have been approved.
    #[must_use]
    pub const fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Returns the number of recorded dates. Never zero.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.moves.len() + 1
    }

    /// Always `false`; present for API symmetry with [`Self::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over all dates, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::once(self.original).chain(self.moves.iter().copied())
    }

    pub(crate) fn record_move(&mut self, date: NaiveDate) {
        self.moves.push(date);
    }
}

impl TryFrom<Vec<NaiveDate>> for TargetDateHistory {
    type Error = TaskDomainError;

    fn try_from(value: Vec<NaiveDate>) -> Result<Self, Self::Error> {
        Self::from_dates(value)
    }
}

impl From<TargetDateHistory> for Vec<NaiveDate> {
    fn from(value: TargetDateHistory) -> Self {
        value.dates().collect()
    }
}
