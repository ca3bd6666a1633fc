//! Services that deliver decision notifications and serve inboxes.

mod dispatcher;
mod inbox;

pub use dispatcher::NotificationDispatcher;
pub use inbox::{
    DEFAULT_INBOX_SIZE, NotificationService, NotificationServiceError, NotificationServiceResult,
};
