//! Pub/sub plumbing towards the Sentinel nodes.
//!
//! The wire protocol and the connection implementation live outside this
//! crate. They are consumed through [`PubSubConnector`] and
//! [`PubSubConnection`]; [`EndpointConnectionManager`] keeps one subscribed
//! connection per configured [`Endpoint`] and funnels every message into a
//! single dispatch function.

mod connection_manager;
mod endpoint;
pub use connection_manager::*;
pub use endpoint::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ConnectError;

/// Single consumer of every message received from any Sentinel.
///
/// Called with `(channel, payload)`.
pub type MessageDispatcher = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Receives messages published on a pattern subscription.
pub trait MessageListener: Send + Sync + 'static {
    fn message(
        &self,
        pattern: &str,
        channel: &str,
        payload: &str,
    );
}

/// An open pub/sub session with one Sentinel.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PubSubConnection: Send + Sync + 'static {
    /// Pattern-subscribes to every channel.
    async fn subscribe_all(&self) -> std::result::Result<(), ConnectError>;

    fn add_listener(
        &self,
        listener: Arc<dyn MessageListener>,
    );

    fn remove_listener(
        &self,
        listener: &Arc<dyn MessageListener>,
    );

    /// Closes the session. No message is delivered afterwards.
    fn close(&self);
}

/// Opens pub/sub sessions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PubSubConnector: Send + Sync + 'static {
    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> std::result::Result<Arc<dyn PubSubConnection>, ConnectError>;
}
