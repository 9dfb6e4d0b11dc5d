use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::time::timeout;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::Endpoint;
use super::MessageDispatcher;
use super::MessageListener;
use super::PubSubConnection;
use super::PubSubConnector;
use crate::BootstrapError;
use crate::BootstrapFailurePolicy;
use crate::ConnectError;
use crate::Result;
use crate::CONNECT_FAILURES;
use crate::LIVE_CONNECTIONS;

/// State of one endpoint's entry in the connection map.
pub(crate) enum ConnectionSlot {
    /// Claimed by a bootstrap that is still connecting
    Connecting,
    Live(Arc<dyn PubSubConnection>),
}

/// Forwards listener callbacks into the injected dispatch function.
struct DispatchingListener {
    dispatch: MessageDispatcher,
    // Shared with the manager; frames still in delivery after close are dropped
    closed: Arc<AtomicBool>,
}

impl MessageListener for DispatchingListener {
    fn message(
        &self,
        pattern: &str,
        channel: &str,
        payload: &str,
    ) {
        if self.closed.load(Ordering::SeqCst) {
            trace!(channel, "manager closed, sentinel message dropped");
            return;
        }
        trace!(pattern, channel, payload, "sentinel message");
        (self.dispatch)(channel, payload);
    }
}

/// Owns the pub/sub connection to every configured Sentinel.
///
/// There is at most one connection per endpoint: a bootstrap claims the
/// endpoint's slot before connecting, so concurrent bootstraps never dial the
/// same Sentinel twice. A connection that completes after [`close`] is torn
/// down instead of being kept.
///
/// [`close`]: EndpointConnectionManager::close
pub struct EndpointConnectionManager {
    endpoints: Vec<Endpoint>,
    connector: Arc<dyn PubSubConnector>,
    listener: Arc<dyn MessageListener>,
    pub(crate) connections: DashMap<Endpoint, ConnectionSlot>,
    closed: Arc<AtomicBool>,
    connect_timeout: Duration,
    failure_policy: BootstrapFailurePolicy,
}

impl EndpointConnectionManager {
    /// Duplicate endpoints are dropped, keeping the first occurrence.
    pub fn new(
        mut endpoints: Vec<Endpoint>,
        connector: Arc<dyn PubSubConnector>,
        dispatch: MessageDispatcher,
        connect_timeout: Duration,
        failure_policy: BootstrapFailurePolicy,
    ) -> Self {
        let mut seen = HashSet::new();
        endpoints.retain(|e| seen.insert(e.clone()));

        let closed = Arc::new(AtomicBool::new(false));

        Self {
            endpoints,
            connector,
            listener: Arc::new(DispatchingListener {
                dispatch,
                closed: closed.clone(),
            }),
            connections: DashMap::new(),
            closed,
            connect_timeout,
            failure_policy,
        }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Endpoints that currently hold a subscribed connection.
    pub fn live_endpoints(&self) -> Vec<Endpoint> {
        self.connections
            .iter()
            .filter(|entry| matches!(entry.value(), ConnectionSlot::Live(_)))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Connects to every endpoint that has no connection yet.
    ///
    /// Endpoints are attempted concurrently and a failing endpoint never stops
    /// the others. Returns the aggregated failure only when every attempt of
    /// this call failed, no connection is live and the policy is
    /// [`BootstrapFailurePolicy::SurfaceWhenAllFail`].
    pub async fn bootstrap(&self) -> Result<()> {
        if self.is_closed() {
            trace!("bootstrap skipped, manager closed");
            return Ok(());
        }

        let claimed: Vec<&Endpoint> = self.endpoints.iter().filter(|e| self.claim(e)).collect();
        if claimed.is_empty() {
            trace!("all sentinels connected or connecting");
            return Ok(());
        }
        debug!(count = claimed.len(), "connecting to sentinels");

        let results = join_all(claimed.into_iter().map(|e| self.connect_endpoint(e))).await;

        let mut connected = 0;
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(()) => connected += 1,
                Err(e) => failures.push(e),
            }
        }

        self.surface(connected, failures)
    }

    /// Closes every connection. Safe to call repeatedly and while a
    /// bootstrap is running.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("closing sentinel connections");
        }

        let endpoints: Vec<Endpoint> = self.connections.iter().map(|e| e.key().clone()).collect();
        for endpoint in endpoints {
            if let Some((endpoint, slot)) = self.connections.remove(&endpoint) {
                self.teardown(&endpoint, slot);
            }
        }
    }

    /// Reserves the endpoint's slot. False if closed or already claimed.
    fn claim(
        &self,
        endpoint: &Endpoint,
    ) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.connections.entry(endpoint.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ConnectionSlot::Connecting);
                true
            }
        }
    }

    /// Gives a claimed slot back after a failed attempt.
    fn release(
        &self,
        endpoint: &Endpoint,
    ) {
        self.connections
            .remove_if(endpoint, |_, slot| matches!(slot, ConnectionSlot::Connecting));
    }

    async fn connect_endpoint(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<(), ConnectError> {
        let connection = match self.open(endpoint).await {
            Ok(connection) => connection,
            Err(e) => {
                self.release(endpoint);
                return Err(self.record_failure(e));
            }
        };

        connection.add_listener(self.listener.clone());
        if let Err(e) = connection.subscribe_all().await {
            connection.remove_listener(&self.listener);
            connection.close();
            self.release(endpoint);
            return Err(self.record_failure(e));
        }

        self.connections
            .insert(endpoint.clone(), ConnectionSlot::Live(connection));
        LIVE_CONNECTIONS.inc();

        // close() may have swept the map while we were connecting
        if self.is_closed() {
            if let Some((endpoint, slot)) = self.connections.remove(endpoint) {
                debug!(%endpoint, "manager closed during connect, dropping connection");
                self.teardown(&endpoint, slot);
            }
            return Ok(());
        }

        info!(%endpoint, "subscribed to sentinel");
        Ok(())
    }

    async fn open(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<Arc<dyn PubSubConnection>, ConnectError> {
        match timeout(self.connect_timeout, self.connector.connect(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectError::Timeout {
                endpoint: endpoint.clone(),
                duration: self.connect_timeout,
            }),
        }
    }

    fn teardown(
        &self,
        endpoint: &Endpoint,
        slot: ConnectionSlot,
    ) {
        if let ConnectionSlot::Live(connection) = slot {
            connection.remove_listener(&self.listener);
            connection.close();
            LIVE_CONNECTIONS.dec();
            debug!(%endpoint, "sentinel connection closed");
        }
    }

    fn record_failure(
        &self,
        e: ConnectError,
    ) -> ConnectError {
        warn!(endpoint = %e.endpoint(), "cannot connect to sentinel: {}", e);
        CONNECT_FAILURES
            .with_label_values(&[&e.endpoint().to_string()])
            .inc();
        e
    }

    fn surface(
        &self,
        connected: usize,
        failures: Vec<ConnectError>,
    ) -> Result<()> {
        let Some(aggregate) = BootstrapError::from_failures(failures) else {
            return Ok(());
        };

        if self.is_closed() {
            debug!("manager closed during bootstrap: {}", aggregate);
            return Ok(());
        }

        if connected > 0 || !self.live_endpoints().is_empty() {
            debug!(
                failed = aggregate.secondary.len() + 1,
                connected, "sentinel bootstrap partially succeeded"
            );
            return Ok(());
        }

        error!("{}", aggregate);
        match self.failure_policy {
            BootstrapFailurePolicy::SurfaceWhenAllFail => Err(aggregate.into()),
            BootstrapFailurePolicy::LogOnly => Ok(()),
        }
    }
}
