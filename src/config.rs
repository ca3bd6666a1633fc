//! Runtime configuration.
//!
//! Configuration is read from an optional JSON document and then overridden
//! by `SQTRACK_*` environment variables:
//!
//! | Variable | Effect |
//! |---|---|
//! | `SQTRACK_STORAGE` | `memory`, `file` or `postgres` |
//! | `SQTRACK_DATA_DIR` | data directory for the file backend |
//! | `SQTRACK_DATABASE_URL` | connection URL for the postgres backend |
//! | `SQTRACK_LOG` | tracing filter directive |
//! | `SQTRACK_NOTIFICATION_RETENTION` | notifications kept per member |
//! | `SQTRACK_INBOX_SIZE` | notifications shown per inbox |

use crate::identity::domain::MemberName;
use crate::notification::{adapters::DEFAULT_RETENTION, services::DEFAULT_INBOX_SIZE};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Data directory used when the file backend is selected without one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// How often file stores poll for external changes by default.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The configuration document is not valid JSON for [`TrackerConfig`].
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An environment override could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// A setting failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where tasks, notifications and the roster are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process memory; nothing survives a restart.
    #[default]
    Memory,
    /// JSON documents in a data directory.
    File {
        /// Directory holding the documents.
        data_dir: String,
        /// Poll interval for external change detection, in milliseconds.
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
    /// A `PostgreSQL` database.
    Postgres {
        /// Connection URL.
        url: String,
        /// Pool size.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

impl StorageConfig {
    /// Returns the file backend poll interval, if that backend is selected.
    #[must_use]
    pub const fn poll_interval(&self) -> Option<Duration> {
        match self {
            Self::File {
                poll_interval_ms, ..
            } => Some(Duration::from_millis(*poll_interval_ms)),
            Self::Memory | Self::Postgres { .. } => None,
        }
    }
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

/// Inbox sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Notifications kept per member.
    pub retention: usize,
    /// Notifications returned per inbox query.
    pub inbox_size: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            inbox_size: DEFAULT_INBOX_SIZE,
        }
    }
}

/// Roster entry created when the roster is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSeed {
    /// Display name.
    pub name: String,
    /// Whether the member is a Head of Department.
    #[serde(default)]
    pub is_hod: bool,
}

impl RosterSeed {
    fn new(name: &str, is_hod: bool) -> Self {
        Self {
            name: name.to_owned(),
            is_hod,
        }
    }
}

/// Complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Storage backend.
    pub storage: StorageConfig,
    /// Inbox sizing.
    pub notifications: NotificationConfig,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Members added to an empty roster at start-up.
    pub seed_roster: Vec<RosterSeed>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            notifications: NotificationConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            seed_roster: vec![
                RosterSeed::new("Hariharan", true),
                RosterSeed::new("Ramesh", false),
                RosterSeed::new("Suresh", false),
                RosterSeed::new("Ganesh", false),
                RosterSeed::new("Mahesh", false),
            ],
        }
    }
}

impl TrackerConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] for invalid JSON.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads the JSON document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Malformed`] when it cannot be parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let location = Path::new(path);
        let parent = location
            .parent()
            .and_then(Path::to_str)
            .filter(|dir| !dir.is_empty())
            .unwrap_or(".");
        let file_name = location
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .ok_or_else(|| read_error(io::Error::from(io::ErrorKind::InvalidInput)))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let raw = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_json(&raw)
    }

    /// Loads the optional file, applies process environment overrides and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigError`] raised while reading, overriding or
    /// validating.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SQTRACK_*` overrides obtained through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable values and
    /// [`ConfigError::Invalid`] when the postgres backend is selected
    /// without a URL.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let data_dir = lookup("SQTRACK_DATA_DIR");
        let database_url = lookup("SQTRACK_DATABASE_URL");
        if let Some(backend) = lookup("SQTRACK_STORAGE") {
            self.storage = match backend.trim().to_ascii_lowercase().as_str() {
                "memory" => StorageConfig::Memory,
                "file" => StorageConfig::File {
                    data_dir: data_dir.clone().unwrap_or_else(|| self.data_dir_or_default()),
                    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
                },
                "postgres" => StorageConfig::Postgres {
                    url: database_url.clone().ok_or_else(|| {
                        ConfigError::Invalid("SQTRACK_DATABASE_URL is required".to_owned())
                    })?,
                    max_connections: DEFAULT_MAX_CONNECTIONS,
                },
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SQTRACK_STORAGE",
                        value: backend,
                    });
                }
            };
        }
        match &mut self.storage {
            StorageConfig::File {
                data_dir: configured,
                ..
            } => {
                if let Some(dir) = data_dir {
                    *configured = dir;
                }
            }
            StorageConfig::Postgres { url, .. } => {
                if let Some(override_url) = database_url {
                    *url = override_url;
                }
            }
            StorageConfig::Memory => {}
        }
        if let Some(filter) = lookup("SQTRACK_LOG") {
            self.log_filter = filter;
        }
        if let Some(raw) = lookup("SQTRACK_NOTIFICATION_RETENTION") {
            self.notifications.retention = parse_count("SQTRACK_NOTIFICATION_RETENTION", raw)?;
        }
        if let Some(raw) = lookup("SQTRACK_INBOX_SIZE") {
            self.notifications.inbox_size = parse_count("SQTRACK_INBOX_SIZE", raw)?;
        }
        Ok(self)
    }

    /// Checks cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.storage {
            StorageConfig::File {
                data_dir,
                poll_interval_ms,
            } => {
                if data_dir.trim().is_empty() {
                    return Err(invalid("file storage needs a data directory"));
                }
                if *poll_interval_ms == 0 {
                    return Err(invalid("poll interval must be positive"));
                }
            }
            StorageConfig::Postgres {
                url,
                max_connections,
            } => {
                if url.trim().is_empty() {
                    return Err(invalid("postgres storage needs a connection URL"));
                }
                if *max_connections == 0 {
                    return Err(invalid("postgres pool needs at least one connection"));
                }
            }
            StorageConfig::Memory => {}
        }
        if self.notifications.retention == 0 || self.notifications.inbox_size == 0 {
            return Err(invalid("notification retention and inbox size must be positive"));
        }
        if self.log_filter.trim().is_empty() {
            return Err(invalid("log filter must not be empty"));
        }
        let mut seen = HashSet::new();
        for seed in &self.seed_roster {
            let name = MemberName::new(seed.name.as_str())
                .map_err(|err| invalid(&format!("seed roster: {err}")))?;
            if !seen.insert(name.as_str().to_lowercase()) {
                return Err(invalid(&format!("seed roster lists '{name}' twice")));
            }
        }
        Ok(())
    }

    fn data_dir_or_default(&self) -> String {
        match &self.storage {
            StorageConfig::File { data_dir, .. } => data_dir.clone(),
            StorageConfig::Memory | StorageConfig::Postgres { .. } => DEFAULT_DATA_DIR.to_owned(),
        }
    }
}

fn parse_count(key: &'static str, raw: String) -> Result<usize, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}
