//! Domain model for owner notifications.

mod ids;
mod message;
mod notification;

pub use ids::NotificationId;
pub use message::{MessageRenderError, NotificationDraft, compose};
pub use notification::{Notification, NotificationKind, PersistedNotification};
