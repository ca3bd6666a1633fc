//! Structured logging set-up.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Directive that failed to parse.
        directive: String,
        /// Underlying parse error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed")]
    AlreadyInstalled,
}

/// Builds the filter used by [`init`].
///
/// `RUST_LOG` wins over `directive` when set and valid.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `directive` does not parse.
pub fn filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        directive: directive.to_owned(),
        source,
    })
}

/// Installs a `fmt` subscriber filtered by `directive`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the directive is invalid or a subscriber
/// is already installed.
pub fn init(directive: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive)?)
        .with_target(true)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInstalled)
}
