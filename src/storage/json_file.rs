//! Whole-document JSON persistence inside a capability-scoped directory.

use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use cap_std::time::SystemTime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::warn;

/// Errors raised while reading or writing a JSON document.
#[derive(Debug, Error)]
pub enum JsonFileError {
    /// Filesystem access failed.
    #[error("i/o error on {file}: {source}")]
    Io {
        /// Document file name.
        file: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The stored document is not valid for the expected type.
    #[error("malformed document {file}: {source}")]
    Malformed {
        /// Document file name.
        file: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// A single JSON document stored as one file in a data directory.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// document, so readers never observe a partially written file.
#[derive(Debug)]
pub struct JsonFile<T> {
    dir: Dir,
    file_name: String,
    _document: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    /// Opens (creating if necessary) `data_dir` and binds `file_name` in it.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(data_dir: &str, file_name: impl Into<String>) -> Result<Self, JsonFileError> {
        let name = file_name.into();
        let io_error = |source| JsonFileError::Io {
            file: name.clone(),
            source,
        };
        std::fs::create_dir_all(data_dir).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(data_dir, ambient_authority()).map_err(io_error)?;
        Ok(Self {
            dir,
            file_name: name,
            _document: PhantomData,
        })
    }

    /// Returns the document file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.file_name
    }

    /// Returns the document's modification time, or `None` if it does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError::Io`] when the metadata cannot be read.
    pub fn modified(&self) -> Result<Option<SystemTime>, JsonFileError> {
        match self.dir.metadata(&self.file_name) {
            Ok(metadata) => metadata.modified().map(Some).map_err(|source| self.io(source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io(err)),
        }
    }

    fn temp_name(&self) -> String {
        format!(".{}.tmp", self.file_name)
    }

    fn io(&self, source: io::Error) -> JsonFileError {
        JsonFileError::Io {
            file: self.file_name.clone(),
            source,
        }
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Reads the document, returning `T::default()` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the file cannot be read or parsed.
    pub fn load(&self) -> Result<T, JsonFileError> {
        let raw = match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => return Err(self.io(err)),
        };
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&raw).map_err(|source| JsonFileError::Malformed {
            file: self.file_name.clone(),
            source,
        })
    }

    /// Replaces the document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when serialisation or the write fails.
    pub fn save(&self, document: &T) -> Result<(), JsonFileError> {
        let payload =
            serde_json::to_vec_pretty(document).map_err(|source| JsonFileError::Malformed {
                file: self.file_name.clone(),
                source,
            })?;
        let temp_name = self.temp_name();
        self.dir
            .write(&temp_name, payload)
            .map_err(|err| self.io(err))?;
        self.dir
            .rename(&temp_name, &self.dir, &self.file_name)
            .map_err(|err| self.io(err))
    }
}

/// Background poller started by [`watch_file`]. Stops when dropped.
#[derive(Debug)]
pub struct WatchHandle {
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stops polling.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Polls the document's modification time and calls `on_change` whenever it
/// moves.
///
/// Writes made through this process are reported as well; callers treat the
/// notification as "re-read the store". Must be called from within a tokio
/// runtime.
pub fn watch_file<T, F>(file: Arc<JsonFile<T>>, interval: Duration, mut on_change: F) -> WatchHandle
where
    T: 'static,
    F: FnMut() + Send + 'static,
{
    let period = interval.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut last_seen = file.modified().ok().flatten();
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match file.modified() {
                Ok(current) if current != last_seen => {
                    last_seen = current;
                    on_change();
                }
                Ok(_) => {}
                Err(err) => warn!(file = file.name(), error = %err, "failed to poll watched file"),
            }
        }
    });
    WatchHandle { task }
}
