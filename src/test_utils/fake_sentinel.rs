use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ConnectError;
use crate::Endpoint;
use crate::MessageListener;
use crate::PubSubConnection;
use crate::PubSubConnector;
use crate::SUBSCRIBE_ALL_PATTERN;

/// In-memory pub/sub session handed out by [`FakeSentinels`].
pub struct FakeConnection {
    pub endpoint: Endpoint,
    listeners: Mutex<Vec<Arc<dyn MessageListener>>>,
    subscribed: AtomicBool,
    closed: AtomicBool,
    fail_subscribe: bool,
}

impl FakeConnection {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Delivers a message to the attached listeners, unless closed.
    pub fn publish(
        &self,
        channel: &str,
        payload: &str,
    ) {
        if self.is_closed() || !self.is_subscribed() {
            return;
        }
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.message(SUBSCRIBE_ALL_PATTERN, channel, payload);
        }
    }

    /// Snapshots the attached listeners, like a reader task that already
    /// picked up a frame. Delivering through it ignores a later close.
    pub fn begin_delivery(&self) -> InFlightFrame {
        InFlightFrame {
            listeners: self.listeners.lock().clone(),
        }
    }
}

/// Frame a connection was delivering when it got closed.
pub struct InFlightFrame {
    listeners: Vec<Arc<dyn MessageListener>>,
}

impl InFlightFrame {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn deliver(
        self,
        channel: &str,
        payload: &str,
    ) {
        for listener in self.listeners {
            listener.message(SUBSCRIBE_ALL_PATTERN, channel, payload);
        }
    }
}

#[async_trait]
impl PubSubConnection for FakeConnection {
    async fn subscribe_all(&self) -> std::result::Result<(), ConnectError> {
        if self.fail_subscribe {
            return Err(ConnectError::Subscribe {
                endpoint: self.endpoint.clone(),
                reason: "ERR unknown command 'PSUBSCRIBE'".to_string(),
            });
        }
        self.subscribed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn add_listener(
        &self,
        listener: Arc<dyn MessageListener>,
    ) {
        self.listeners.lock().push(listener);
    }

    fn remove_listener(
        &self,
        listener: &Arc<dyn MessageListener>,
    ) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeState {
    unreachable: HashSet<Endpoint>,
    reject_subscribe: HashSet<Endpoint>,
    connect_delay: Duration,
    attempts: HashMap<Endpoint, usize>,
    connections: Vec<Arc<FakeConnection>>,
}

/// Scriptable set of Sentinels implementing [`PubSubConnector`].
///
/// Clones share state, so a test keeps one handle and gives another to the
/// code under test.
#[derive(Clone, Default)]
pub struct FakeSentinels {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSentinels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(
        &self,
        endpoint: &Endpoint,
    ) {
        self.state.lock().unreachable.insert(endpoint.clone());
    }

    pub fn set_reachable(
        &self,
        endpoint: &Endpoint,
    ) {
        self.state.lock().unreachable.remove(endpoint);
    }

    pub fn reject_subscribe(
        &self,
        endpoint: &Endpoint,
    ) {
        self.state.lock().reject_subscribe.insert(endpoint.clone());
    }

    /// Every connect waits this long before completing.
    pub fn set_connect_delay(
        &self,
        delay: Duration,
    ) {
        self.state.lock().connect_delay = delay;
    }

    pub fn attempts(
        &self,
        endpoint: &Endpoint,
    ) -> usize {
        self.state.lock().attempts.get(endpoint).copied().unwrap_or(0)
    }

    pub fn connections_to(
        &self,
        endpoint: &Endpoint,
    ) -> Vec<Arc<FakeConnection>> {
        self.state
            .lock()
            .connections
            .iter()
            .filter(|c| &c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Connections handed out and not closed yet.
    pub fn open_connections(
        &self,
        endpoint: &Endpoint,
    ) -> usize {
        self.connections_to(endpoint)
            .iter()
            .filter(|c| !c.is_closed())
            .count()
    }

    pub fn total_open_connections(&self) -> usize {
        self.state
            .lock()
            .connections
            .iter()
            .filter(|c| !c.is_closed())
            .count()
    }

    /// Publishes on every open connection to `endpoint`.
    pub fn publish(
        &self,
        endpoint: &Endpoint,
        channel: &str,
        payload: &str,
    ) {
        for connection in self.connections_to(endpoint) {
            connection.publish(channel, payload);
        }
    }
}

#[async_trait]
impl PubSubConnector for FakeSentinels {
    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<Arc<dyn PubSubConnection>, ConnectError> {
        let delay = {
            let mut state = self.state.lock();
            *state.attempts.entry(endpoint.clone()).or_insert(0) += 1;
            state.connect_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.unreachable.contains(endpoint) {
            return Err(ConnectError::Unreachable {
                endpoint: endpoint.clone(),
                reason: "Connection refused".to_string(),
            });
        }
        let connection = Arc::new(FakeConnection {
            endpoint: endpoint.clone(),
            listeners: Mutex::new(Vec::new()),
            subscribed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            fail_subscribe: state.reject_subscribe.contains(endpoint),
        });
        state.connections.push(connection.clone());
        Ok(connection as Arc<dyn PubSubConnection>)
    }
}
