//! Sentinel topology watcher.
//!
//! Subscribes to every channel of a set of Sentinel nodes, classifies the
//! events they publish and turns failover bursts into a single, debounced
//! topology refresh. Events describing the Sentinel group itself trigger a
//! reconnect to any Sentinel that is not connected.
//!
//! The pub/sub transport is pluggable through [`PubSubConnector`]; deferred
//! work runs on a [`TaskExecutor`], by default [`TokioExecutor`].

mod classifier;
mod config;
mod constants;
mod debounce;
mod errors;
mod executor;
mod metrics;
mod network;
mod watcher;

pub use classifier::*;
pub use config::*;
pub use constants::SUBSCRIBE_ALL_PATTERN;
pub use debounce::*;
pub use errors::*;
pub use executor::*;
pub use metrics::*;
pub use network::*;
pub use watcher::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
