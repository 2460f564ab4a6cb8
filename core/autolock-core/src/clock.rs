//! Authoritative last-activity clock.
//!
//! Exactly one context (the primary) owns an `ActivityClock`. Writes go
//! through `pub(crate)` methods so only the tracker, the delegation inbox,
//! and the global-signal wiring can move it; UI code gets a read-only view.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct ActivityClock {
    last: Mutex<Instant>,
}

impl ActivityClock {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            last: Mutex::new(now),
        }
    }

    /// Records user activity at `at`. The clock only moves forward, so
    /// reports drained out of order cannot shrink the recorded activity.
    pub(crate) fn touch(&self, at: Instant) {
        if let Ok(mut last) = self.last.lock() {
            if at > *last {
                *last = at;
            }
        }
    }

    /// Rewinds the clock, pretending the user has been idle longer.
    /// Debug-command support only.
    #[cfg(feature = "debug-commands")]
    pub(crate) fn rewind(&self, by: Duration) {
        if let Ok(mut last) = self.last.lock() {
            if let Some(rewound) = last.checked_sub(by) {
                *last = rewound;
            }
        }
    }

    pub fn last_activity(&self) -> Instant {
        self.last
            .lock()
            .map(|last| *last)
            .unwrap_or_else(|_| Instant::now())
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity())
    }
}
