//! Countdown timers for the coordinator's periodic work.

use std::time::Duration;

/// A repeating countdown fed by explicit elapsed time.
///
/// The coordinator is driven by `tick(elapsed)` calls rather than wall
/// clocks, which keeps poll and heartbeat scheduling deterministic under
/// test. When the remaining time is exhausted the timer fires once and
/// rearms to the full interval; any overshoot is discarded, so a long
/// stall produces one firing, not a burst.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    interval: Duration,
    remaining: Duration,
}

impl CountdownTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            remaining: interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advances the timer. Returns `true` if it fired.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.remaining = self.interval;
            true
        } else {
            false
        }
    }

    /// Rearms to the full interval without firing.
    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }
}
