//! Application wiring.
//!
//! [`Tracker::open`] builds the stores selected by [`TrackerConfig`], seeds
//! an empty roster and exposes the services the presentation layer calls.

use crate::config::{StorageConfig, TrackerConfig};
use crate::identity::{
    adapters::{file::FileTeamDirectory, local::LocalIdentityProvider, memory::InMemoryTeamDirectory},
    ports::TeamDirectory,
    services::{RosterError, TeamRosterService},
};
use crate::notification::{
    adapters::{file::FileNotificationRepository, memory::InMemoryNotificationRepository},
    ports::NotificationRepository,
    services::{NotificationDispatcher, NotificationService},
};
use crate::storage::{JsonFileError, WatchHandle};
use crate::task::{
    adapters::{file::FileTaskRepository, memory::InMemoryTaskRepository},
    ports::TaskRepository,
    services::TaskLifecycleService,
};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Notifier wired into the lifecycle service.
pub type Dispatcher = NotificationDispatcher<dyn NotificationRepository, DefaultClock>;

/// Lifecycle service over the configured stores.
pub type Lifecycle =
    TaskLifecycleService<dyn TaskRepository, Dispatcher, dyn TeamDirectory, DefaultClock>;

/// Inbox service over the configured notification store.
pub type Inbox = NotificationService<dyn NotificationRepository>;

/// Roster service over the configured directory.
pub type Roster = TeamRosterService<dyn TeamDirectory, DefaultClock>;

/// Identity provider resolving roles from the configured directory.
pub type Identity = LocalIdentityProvider<dyn TeamDirectory, DefaultClock>;

/// Errors raised while starting the tracker.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A file store could not be opened.
    #[error(transparent)]
    File(#[from] JsonFileError),

    /// The database pool could not be created.
    #[cfg(feature = "postgres")]
    #[error("cannot connect to postgres: {0}")]
    Database(#[from] diesel::r2d2::PoolError),

    /// The postgres backend was requested but is not compiled in.
    #[error("postgres storage requires the `postgres` feature")]
    PostgresUnavailable,

    /// Roster seeding failed.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

struct Stores {
    tasks: Arc<dyn TaskRepository>,
    notifications: Arc<dyn NotificationRepository>,
    directory: Arc<dyn TeamDirectory>,
    watchers: Vec<WatchHandle>,
}

/// Running tracker: the configured stores and the services over them.
///
/// File watchers stop when the tracker is dropped.
pub struct Tracker {
    lifecycle: Lifecycle,
    inbox: Inbox,
    roster: Roster,
    identity: Arc<Identity>,
    _watchers: Vec<WatchHandle>,
}

impl Tracker {
    /// Opens the configured stores and wires the services.
    ///
    /// Must be called from within a tokio runtime when the file backend is
    /// selected, since its change watchers run as tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] when a store cannot be opened or the roster
    /// cannot be seeded.
    pub async fn open(config: &TrackerConfig) -> Result<Self, BootstrapError> {
        let stores = open_stores(config)?;
        let clock = Arc::new(DefaultClock);
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&stores.notifications),
            Arc::clone(&clock),
        ));
        let lifecycle = TaskLifecycleService::new(
            stores.tasks,
            dispatcher,
            Arc::clone(&stores.directory),
            Arc::clone(&clock),
        );
        let inbox = NotificationService::new(stores.notifications)
            .with_inbox_size(config.notifications.inbox_size);
        let roster = TeamRosterService::new(Arc::clone(&stores.directory), Arc::clone(&clock));
        let seeded = roster
            .seed_if_empty(
                config
                    .seed_roster
                    .iter()
                    .map(|seed| (seed.name.clone(), seed.is_hod)),
            )
            .await?;
        let identity = Arc::new(open_identity(&config.storage, stores.directory, clock)?);
        info!(
            backend = backend_name(&config.storage),
            seeded, "tracker started"
        );
        Ok(Self {
            lifecycle,
            inbox,
            roster,
            identity,
            _watchers: stores.watchers,
        })
    }

    /// Task lifecycle operations.
    #[must_use]
    pub const fn tasks(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Inbox operations.
    #[must_use]
    pub const fn notifications(&self) -> &Inbox {
        &self.inbox
    }

    /// Roster management.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Sign-up, sign-in and role management.
    #[must_use]
    pub fn identity(&self) -> Arc<Identity> {
        Arc::clone(&self.identity)
    }
}

fn open_stores(config: &TrackerConfig) -> Result<Stores, BootstrapError> {
    let retention = config.notifications.retention;
    match &config.storage {
        StorageConfig::Memory => Ok(Stores {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::with_retention(retention)),
            directory: Arc::new(InMemoryTeamDirectory::new()),
            watchers: Vec::new(),
        }),
        StorageConfig::File {
            data_dir,
            poll_interval_ms,
        } => {
            let interval = std::time::Duration::from_millis(*poll_interval_ms);
            let tasks = FileTaskRepository::open(data_dir)?;
            let notifications = FileNotificationRepository::open_with_retention(data_dir, retention)?;
            let watchers = vec![
                tasks.watch_external_changes(interval),
                notifications.watch_external_changes(interval),
            ];
            Ok(Stores {
                tasks: Arc::new(tasks),
                notifications: Arc::new(notifications),
                directory: Arc::new(FileTeamDirectory::open(data_dir)?),
                watchers,
            })
        }
        StorageConfig::Postgres {
            url,
            max_connections,
        } => open_postgres(url, *max_connections, retention),
    }
}

/// Accounts persist beside the file stores; the other backends keep them in
/// memory.
fn open_identity(
    storage: &StorageConfig,
    directory: Arc<dyn TeamDirectory>,
    clock: Arc<DefaultClock>,
) -> Result<Identity, BootstrapError> {
    match storage {
        StorageConfig::File { data_dir, .. } => {
            Ok(LocalIdentityProvider::open(directory, clock, data_dir)?)
        }
        StorageConfig::Memory | StorageConfig::Postgres { .. } => {
            Ok(LocalIdentityProvider::new(directory, clock))
        }
    }
}

#[cfg(feature = "postgres")]
fn open_postgres(url: &str, max_connections: u32, retention: usize) -> Result<Stores, BootstrapError> {
    use crate::identity::adapters::postgres::PostgresTeamDirectory;
    use crate::notification::adapters::postgres::PostgresNotificationRepository;
    use crate::task::adapters::postgres::PostgresTaskRepository;

    let pool = crate::storage::postgres::connect(url, max_connections)?;
    Ok(Stores {
        tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
        notifications: Arc::new(PostgresNotificationRepository::with_retention(
            pool.clone(),
            retention,
        )),
        directory: Arc::new(PostgresTeamDirectory::new(pool)),
        watchers: Vec::new(),
    })
}

#[cfg(not(feature = "postgres"))]
const fn open_postgres(
    _url: &str,
    _max_connections: u32,
    _retention: usize,
) -> Result<Stores, BootstrapError> {
    Err(BootstrapError::PostgresUnavailable)
}

const fn backend_name(storage: &StorageConfig) -> &'static str {
    match storage {
        StorageConfig::Memory => "memory",
        StorageConfig::File { .. } => "file",
        StorageConfig::Postgres { .. } => "postgres",
    }
}
