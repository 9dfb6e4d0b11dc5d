//! Sentinel Watcher Error Hierarchy
//!
//! Defines the error types surfaced by the watcher, split by the layer that
//! produces them: per-endpoint connection failures, the aggregated bootstrap
//! failure, and configuration problems.

use std::time::Duration;

use ::config::ConfigError;

use crate::Endpoint;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single watchdog could not be reached or subscribed
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Every watchdog attempted during a bootstrap failed
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Malformed `host:port` string
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Builder was finished without a required collaborator
    #[error("Watcher builder is missing the {0}")]
    Builder(&'static str),
}

/// Failure to establish a pub/sub session with one watchdog.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Endpoint refused or dropped the connection
    #[error("Watchdog {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: Endpoint, reason: String },

    /// Connect attempt exceeded the configured timeout
    #[error("Connection to watchdog {endpoint} timed out after {duration:?}")]
    Timeout { endpoint: Endpoint, duration: Duration },

    /// Session opened but the pattern subscription was rejected
    #[error("Subscribing to watchdog {endpoint} failed: {reason}")]
    Subscribe { endpoint: Endpoint, reason: String },
}

impl ConnectError {
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            ConnectError::Unreachable { endpoint, .. } => endpoint,
            ConnectError::Timeout { endpoint, .. } => endpoint,
            ConnectError::Subscribe { endpoint, .. } => endpoint,
        }
    }
}

/// Aggregated bootstrap failure.
///
/// `primary` is the first failure observed; the rest are kept in the order
/// they were collected.
#[derive(Debug, thiserror::Error)]
#[error("Could not connect to any watchdog ({} failed attempts)", 1 + .secondary.len())]
pub struct BootstrapError {
    #[source]
    pub primary: ConnectError,
    pub secondary: Vec<ConnectError>,
}

impl BootstrapError {
    /// Builds the aggregate from failures in collection order.
    ///
    /// Returns `None` when there is nothing to aggregate.
    pub(crate) fn from_failures(failures: Vec<ConnectError>) -> Option<Self> {
        let mut iter = failures.into_iter();
        let primary = iter.next()?;
        Some(Self {
            primary,
            secondary: iter.collect(),
        })
    }

    /// All failures, primary first.
    pub fn causes(&self) -> impl Iterator<Item = &ConnectError> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}
