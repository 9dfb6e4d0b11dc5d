use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tracing::debug;
use tracing::trace;

use super::DebounceWindow;
use super::TriggerOutcome;
use crate::Category;
use crate::Task;
use crate::TaskExecutor;
use crate::TRIGGER_OUTCOMES;

/// Per-category rate limiter that defers actions to the end of a window.
pub struct DebounceScheduler {
    executor: Arc<dyn TaskExecutor>,
    window: Duration,
    // Indexed by `Category::index`
    windows: [ArcSwapOption<DebounceWindow>; 2],
}

impl DebounceScheduler {
    pub fn new(
        executor: Arc<dyn TaskExecutor>,
        window: Duration,
    ) -> Self {
        Self {
            executor,
            window,
            windows: [ArcSwapOption::empty(), ArcSwapOption::empty()],
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits or drops one trigger for `category`.
    ///
    /// `factory` is only called when the trigger opens a new window; the task
    /// it returns is submitted to run after the window's remaining duration.
    pub fn trigger<F>(
        &self,
        category: Category,
        factory: F,
    ) -> TriggerOutcome
    where
        F: FnOnce() -> Task,
    {
        let outcome = self.admit(category, factory);
        TRIGGER_OUTCOMES
            .with_label_values(&[category.as_str(), outcome.as_str()])
            .inc();
        outcome
    }

    fn admit<F>(
        &self,
        category: Category,
        factory: F,
    ) -> TriggerOutcome
    where
        F: FnOnce() -> Task,
    {
        if self.executor.is_shutting_down() {
            trace!(?category, "executor shutting down, trigger ignored");
            return TriggerOutcome::ShuttingDown;
        }

        let slot = &self.windows[category.index()];
        let previous = slot.load_full();
        if let Some(open) = previous.as_ref() {
            if !open.is_expired() {
                trace!(?category, remaining = ?open.remaining(), "window open, trigger suppressed");
                return TriggerOutcome::Suppressed;
            }
        }

        let window = Arc::new(DebounceWindow::open(category, self.window));
        let current = slot.compare_and_swap(&previous, Some(window.clone()));
        if !same_window(&current, &previous) {
            trace!(?category, "lost window race to a concurrent trigger");
            return TriggerOutcome::Contended;
        }

        let task = factory();
        let delay = window.remaining();
        debug!(?category, ?delay, "debounce window opened, action scheduled");
        if delay.is_zero() {
            self.executor.submit_now(task);
        } else {
            self.executor.submit_after(task, delay);
        }
        TriggerOutcome::Scheduled
    }

    /// The most recently opened window for `category`, expired or not.
    pub fn current_window(
        &self,
        category: Category,
    ) -> Option<Arc<DebounceWindow>> {
        self.windows[category.index()].load_full()
    }
}

fn same_window(
    a: &Option<Arc<DebounceWindow>>,
    b: &Option<Arc<DebounceWindow>>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
