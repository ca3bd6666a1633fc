//! Adapter implementations for identity ports.

pub mod file;
pub mod local;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::identity::domain::{MemberId, TeamMember};

/// Returns `true` when a member other than `except` already uses `name`.
pub(crate) fn name_taken<'a>(
    members: impl IntoIterator<Item = &'a TeamMember>,
    name: &str,
    except: Option<MemberId>,
) -> bool {
    members
        .into_iter()
        .any(|member| Some(member.id()) != except && member.name().matches(name))
}

/// Sorts members alphabetically, ignoring case.
pub(crate) fn sort_by_name(members: &mut [TeamMember]) {
    members.sort_by_key(|member| member.name().as_str().to_lowercase());
}
