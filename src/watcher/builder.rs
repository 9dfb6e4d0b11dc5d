use std::sync::Arc;
use std::time::Duration;

use super::TopologyWatcher;
use crate::BootstrapFailurePolicy;
use crate::Endpoint;
use crate::Error;
use crate::PubSubConnector;
use crate::Result;
use crate::TaskExecutor;
use crate::TokioExecutor;
use crate::WatcherConfig;

pub struct TopologyWatcherBuilder {
    config: WatcherConfig,
    connector: Option<Arc<dyn PubSubConnector>>,
    executor: Option<Arc<dyn TaskExecutor>>,
}

impl TopologyWatcherBuilder {
    /// Create a new builder with default config for the given Sentinels
    pub fn new(
        sentinels: Vec<Endpoint>,
        master_id: impl Into<String>,
    ) -> Self {
        Self {
            config: WatcherConfig::new(master_id, sentinels),
            connector: None,
            executor: None,
        }
    }

    /// Pub/sub connector used to reach the Sentinels (required)
    pub fn connector(
        mut self,
        connector: Arc<dyn PubSubConnector>,
    ) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Executor running the debounced actions
    /// (default: [`TokioExecutor`] on the current runtime)
    pub fn executor(
        mut self,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set debounce window (default: 5s)
    ///
    /// Stored in whole milliseconds; a non-zero window below 1ms becomes 1ms.
    pub fn debounce_window(
        mut self,
        window: Duration,
    ) -> Self {
        self.config.debounce_window_ms = to_millis(window);
        self
    }

    /// Set connect timeout per Sentinel (default: 10s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.connect_timeout_ms = to_millis(timeout);
        self
    }

    /// Set what `bind` reports when no Sentinel is reachable
    /// (default: [`BootstrapFailurePolicy::SurfaceWhenAllFail`])
    pub fn failure_policy(
        mut self,
        policy: BootstrapFailurePolicy,
    ) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Completely replaces the configuration, including master id and
    /// Sentinels passed to [`new`](TopologyWatcherBuilder::new).
    pub fn set_config(
        mut self,
        config: WatcherConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Build the watcher. No connection is opened until the first `bind`.
    pub fn build(self) -> Result<TopologyWatcher> {
        self.config.validate()?;
        let connector = self.connector.ok_or(Error::Builder("pub/sub connector"))?;
        let executor = match self.executor {
            Some(executor) => executor,
            None => Arc::new(TokioExecutor::try_current()?),
        };
        Ok(TopologyWatcher::new(&self.config, connector, executor))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`. Never turns a non-zero
/// duration into zero.
fn to_millis(duration: Duration) -> u64 {
    if duration.is_zero() {
        return 0;
    }
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX).max(1)
}
