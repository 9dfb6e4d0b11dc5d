//! Sentinel topology watcher
//!
//! Provides the public entry point of the crate:
//! - [`TopologyWatcher`] - binds refresh callbacks and owns the Sentinel
//!   connections
//! - [`TopologyWatcherBuilder`] - configurable construction
//!
//! # Basic Usage
//! ```ignore
//! use std::sync::Arc;
//! use sentinel_watch::{Endpoint, TopologyWatcher};
//!
//! let watcher = TopologyWatcher::builder(
//!     vec![Endpoint::new("10.0.0.1", 26379), Endpoint::new("10.0.0.2", 26379)],
//!     "mymaster",
//! )
//! .connector(Arc::new(my_connector))
//! .build()?;
//!
//! // Runs at most once per 5s window after a failover is announced
//! watcher.bind(|| topology.refresh()).await?;
//!
//! watcher.close();
//! ```

mod builder;
mod topology_watcher;
pub use builder::*;
pub use topology_watcher::*;
