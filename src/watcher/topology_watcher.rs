use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use arc_swap::ArcSwap;
use futures::FutureExt;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::TopologyWatcherBuilder;
use crate::Category;
use crate::ClassificationRules;
use crate::DebounceScheduler;
use crate::Endpoint;
use crate::EndpointConnectionManager;
use crate::MessageDispatcher;
use crate::PubSubConnector;
use crate::Result;
use crate::Task;
use crate::TaskExecutor;
use crate::TriggerOutcome;
use crate::WatcherConfig;
use crate::REFRESH_RUNS;

/// Caller-supplied action run on every debounced topology change.
pub type RefreshCallback = Arc<dyn Fn() + Send + Sync>;

/// Watches the Sentinels of one master and runs the bound callbacks when
/// they announce a topology change.
///
/// A failover is announced by several messages in quick succession, possibly
/// from every Sentinel. The watcher coalesces them: the callbacks run once,
/// at the end of the debounce window opened by the first message.
pub struct TopologyWatcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    rules: ClassificationRules,
    // Copy-on-write; read by scheduled refresh tasks
    callbacks: Arc<ArcSwap<Vec<RefreshCallback>>>,
    scheduler: DebounceScheduler,
    connections: Arc<EndpointConnectionManager>,
    closed: AtomicBool,
}

impl TopologyWatcher {
    pub fn builder(
        sentinels: Vec<Endpoint>,
        master_id: impl Into<String>,
    ) -> TopologyWatcherBuilder {
        TopologyWatcherBuilder::new(sentinels, master_id)
    }

    /// Builds a watcher from a loaded configuration.
    pub fn from_config(
        config: WatcherConfig,
        connector: Arc<dyn PubSubConnector>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Result<Self> {
        TopologyWatcherBuilder::new(Vec::new(), String::new())
            .set_config(config)
            .connector(connector)
            .executor(executor)
            .build()
    }

    pub(super) fn new(
        config: &WatcherConfig,
        connector: Arc<dyn PubSubConnector>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        // The connection manager reaches back through a weak reference, so
        // dropping the watcher is never blocked by its own listener.
        let inner = Arc::new_cyclic(|weak: &Weak<WatcherInner>| {
            let weak = weak.clone();
            let dispatch: MessageDispatcher = Arc::new(move |channel: &str, payload: &str| {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(channel, payload);
                }
            });

            WatcherInner {
                rules: ClassificationRules::new(config.master_id.clone()),
                callbacks: Arc::new(ArcSwap::from_pointee(Vec::new())),
                scheduler: DebounceScheduler::new(executor, config.debounce_window()),
                connections: Arc::new(EndpointConnectionManager::new(
                    config.sentinels.clone(),
                    connector,
                    dispatch,
                    config.connect_timeout(),
                    config.failure_policy,
                )),
                closed: AtomicBool::new(false),
            }
        });

        Self { inner }
    }

    /// Registers `callback` and connects to every Sentinel not connected yet.
    ///
    /// # Errors
    /// Returns [`Error::Bootstrap`](crate::Error::Bootstrap) when no Sentinel
    /// could be reached, unless the failure policy is
    /// [`LogOnly`](crate::BootstrapFailurePolicy::LogOnly). The callback stays
    /// registered either way.
    pub async fn bind<F>(
        &self,
        callback: F,
    ) -> Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: RefreshCallback = Arc::new(callback);
        self.inner.callbacks.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(callback.clone());
            next
        });

        self.inner.connections.bootstrap().await
    }

    /// Stops processing Sentinel messages and closes every connection.
    ///
    /// Idempotent. Actions already scheduled still run.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            info!(master_id = self.inner.rules.master_id(), "closing topology watcher");
        }
        self.inner.connections.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn master_id(&self) -> &str {
        self.inner.rules.master_id()
    }

    pub fn callback_count(&self) -> usize {
        self.inner.callbacks.load().len()
    }

    /// Sentinels currently holding a subscribed connection.
    pub fn live_endpoints(&self) -> Vec<Endpoint> {
        self.inner.connections.live_endpoints()
    }

    #[cfg(test)]
    pub(super) fn dispatch(
        &self,
        channel: &str,
        payload: &str,
    ) {
        self.inner.dispatch(channel, payload);
    }

    #[cfg(test)]
    pub(super) fn scheduler(&self) -> &DebounceScheduler {
        &self.inner.scheduler
    }
}

impl Drop for TopologyWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

impl WatcherInner {
    fn dispatch(
        &self,
        channel: &str,
        payload: &str,
    ) {
        if self.closed.load(Ordering::SeqCst) {
            trace!(channel, "watcher closed, message ignored");
            return;
        }

        for category in self.rules.classify(channel, payload).iter() {
            let outcome = match category {
                Category::RefreshTopology => self.scheduler.trigger(category, || {
                    debug!("Received topology changed signal from Sentinel, scheduling topology update");
                    self.refresh_task()
                }),
                Category::ReconnectWatchdogs => self.scheduler.trigger(category, || {
                    debug!("Received sentinel state changed signal from Sentinel, scheduling reconnect attempts");
                    self.reconnect_task()
                }),
            };
            if outcome != TriggerOutcome::Scheduled {
                trace!(channel, ?category, ?outcome, "trigger not scheduled");
            }
        }
    }

    /// Runs the callbacks registered at execution time, in order.
    fn refresh_task(&self) -> Task {
        let callbacks = self.callbacks.clone();
        async move {
            REFRESH_RUNS.inc();
            for callback in callbacks.load().iter() {
                callback();
            }
        }
        .boxed()
    }

    fn reconnect_task(&self) -> Task {
        let connections = self.connections.clone();
        async move {
            if let Err(e) = connections.bootstrap().await {
                warn!("sentinel reconnect failed: {}", e);
            }
        }
        .boxed()
    }
}
