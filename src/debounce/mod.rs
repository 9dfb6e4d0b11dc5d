//! Trailing-edge debounce of Sentinel triggers.
//!
//! The first qualifying trigger of a quiet period opens a [`DebounceWindow`]
//! for its category and schedules the action to run when the window closes.
//! Every further trigger of that category is dropped until the window has
//! expired. Windows are swapped in with compare-and-swap, so the hot path never
//! takes a lock.

mod debounce_scheduler;
mod debounce_window;
pub use debounce_scheduler::*;
pub use debounce_window::*;


/// What happened to a single trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Opened a new window; the action runs when it closes
    Scheduled,
    /// A window for the category is still open
    Suppressed,
    /// A concurrent trigger opened the window first
    Contended,
    /// Executor no longer accepts work; no window opened
    ShuttingDown,
}

impl TriggerOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerOutcome::Scheduled => "scheduled",
            TriggerOutcome::Suppressed => "suppressed",
            TriggerOutcome::Contended => "contended",
            TriggerOutcome::ShuttingDown => "shutdown",
        }
    }
}
