//! Publish/subscribe change feed shared by the store adapters.
//!
//! Stores announce writes through a [`ChangeFeed`]. Consumers either poll a
//! [`Subscription`] directly or hand it a callback with
//! [`Subscription::on_change`], which returns a [`ListenerHandle`] that
//! unsubscribes when dropped.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Buffered events per subscriber before slow readers start lagging.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out channel announcing store changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> ChangeFeed<E> {
    /// Creates a feed with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a feed buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announces a change to every live subscriber.
    pub fn publish(&self, event: E) {
        let delivered = self.sender.send(event).unwrap_or(0);
        trace!(delivered, "change published");
    }

    /// Registers a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<E> {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for ChangeFeed<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`ChangeFeed`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<E> {
    receiver: broadcast::Receiver<E>,
}

impl<E: Clone> Subscription<E> {
    /// Waits for the next change.
    ///
    /// Events missed by a lagging subscriber are skipped. Returns `None` once
    /// the owning store has been dropped.
    pub async fn recv(&mut self) -> Option<E> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged behind change feed");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next buffered change without waiting.
    pub fn try_recv(&mut self) -> Option<E> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged behind change feed");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}

impl<E: Clone + Send + 'static> Subscription<E> {
    /// Runs `callback` for every change on a background task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the handle unsubscribes immediately"]
    pub fn on_change<F>(mut self, mut callback: F) -> ListenerHandle
    where
        F: FnMut(E) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(event) = self.recv().await {
                callback(event);
            }
        });
        ListenerHandle { task }
    }
}

/// Handle for a callback registered with [`Subscription::on_change`].
#[derive(Debug)]
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Stops delivering changes to the callback.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Returns `true` once the listener has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
