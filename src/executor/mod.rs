//! Task execution facility used to run deferred actions.
//!
//! The debounce scheduler only depends on the [`TaskExecutor`] trait;
//! [`TokioExecutor`] is the runtime-backed implementation.

mod tokio_executor;
pub use tokio_executor::*;


use std::time::Duration;

use futures::future::BoxFuture;
#[cfg(test)]
use mockall::automock;

/// Unit of work handed to an executor.
pub type Task = BoxFuture<'static, ()>;

#[cfg_attr(test, automock)]
pub trait TaskExecutor: Send + Sync + 'static {
    /// Runs `task` as soon as possible.
    fn submit_now(
        &self,
        task: Task,
    );

    /// Runs `task` once `delay` has elapsed.
    fn submit_after(
        &self,
        task: Task,
        delay: Duration,
    );

    /// True once the executor stopped accepting work.
    fn is_shutting_down(&self) -> bool;
}
