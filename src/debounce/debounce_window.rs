use tokio::time::Duration;
use tokio::time::Instant;

use crate::Category;

/// Admission window opened by the first qualifying trigger of a quiet period.
#[derive(Clone, Debug)]
pub struct DebounceWindow {
    pub category: Category,
    pub opened_at: Instant,
    pub duration: Duration,
}

impl DebounceWindow {
    pub fn open(
        category: Category,
        duration: Duration,
    ) -> Self {
        Self {
            category,
            opened_at: Instant::now(),
            duration,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.opened_at + self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.deadline() <= Instant::now()
    }
}
