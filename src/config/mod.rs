//! Configuration management for the Sentinel watcher.
//!
//! Loads [`WatcherConfig`] from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. Config file passed by the caller, or named by `SENTINEL_WATCH_CONFIG`
//! 3. Environment variables prefixed `SENTINEL_WATCH__` (highest priority)

mod watcher_config;
pub use watcher_config::*;
