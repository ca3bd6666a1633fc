//! Adapter implementations for notification ports.

pub mod file;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::identity::domain::MemberName;
use crate::notification::domain::Notification;

/// Notifications kept per recipient unless configured otherwise.
pub const DEFAULT_RETENTION: usize = 100;

/// Sorts notifications most recent first.
pub(crate) fn sort_most_recent_first(notifications: &mut [Notification]) {
    notifications.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().into_inner().cmp(&right.id().into_inner()))
    });
}

/// Drops the oldest notifications of `user` beyond `retention`.
///
/// Returns how many were discarded.
pub(crate) fn enforce_retention(
    notifications: &mut Vec<Notification>,
    user: &MemberName,
    retention: usize,
) -> usize {
    let mut owned: Vec<&Notification> = notifications
        .iter()
        .filter(|notification| notification.is_for(user))
        .collect();
    if owned.len() <= retention {
        return 0;
    }
    sort_refs_most_recent_first(&mut owned);
    let expired: Vec<_> = owned
        .into_iter()
        .skip(retention)
        .map(Notification::id)
        .collect();
    notifications.retain(|notification| !expired.contains(&notification.id()));
    expired.len()
}

fn sort_refs_most_recent_first(notifications: &mut [&Notification]) {
    notifications.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().into_inner().cmp(&right.id().into_inner()))
    });
}

/// Returns up to `limit` notifications of `user`, most recent first.
pub(crate) fn recent_for<'a>(
    notifications: impl IntoIterator<Item = &'a Notification>,
    user: &MemberName,
    limit: usize,
) -> Vec<Notification> {
    let mut owned: Vec<Notification> = notifications
        .into_iter()
        .filter(|notification| notification.is_for(user))
        .cloned()
        .collect();
    sort_most_recent_first(&mut owned);
    owned.truncate(limit);
    owned
}

/// Marks every unread notification of `user` read and returns the count.
pub(crate) fn mark_all_read_for(notifications: &mut [Notification], user: &MemberName) -> usize {
    let mut changed = 0;
    for notification in notifications
        .iter_mut()
        .filter(|notification| notification.is_for(user) && !notification.is_read())
    {
        notification.mark_read();
        changed += 1;
    }
    changed
}
