use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::Task;
use super::TaskExecutor;
use crate::Error;
use crate::Result;

/// [`TaskExecutor`] spawning onto a tokio runtime.
///
/// Delayed tasks wait on the runtime timer, so they follow paused time in
/// tests. [`shutdown`](TokioExecutor::shutdown) drops every task still waiting
/// for its delay and rejects new submissions.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
    shutdown: CancellationToken,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            shutdown: CancellationToken::new(),
        }
    }

    /// Binds to the runtime the caller is running on.
    pub fn try_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| Error::Builder("executor (no tokio runtime in scope)"))
    }

    /// Stops accepting work and cancels pending delayed tasks.
    ///
    /// Tasks that already started keep running.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl TaskExecutor for TokioExecutor {
    fn submit_now(
        &self,
        task: Task,
    ) {
        if self.is_shutting_down() {
            trace!("executor shutting down, task rejected");
            return;
        }
        self.handle.spawn(task);
    }

    fn submit_after(
        &self,
        task: Task,
        delay: Duration,
    ) {
        if self.is_shutting_down() {
            trace!("executor shutting down, delayed task rejected");
            return;
        }
        let token = self.shutdown.clone();
        self.handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(?delay, "delayed task dropped on executor shutdown");
                }
                _ = sleep(delay) => task.await,
            }
        });
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
