//! Process-wide broadcast of "user is active now" events.
//!
//! Anything in the application can publish or observe activity through this
//! signal; UI code that cannot attach raw input listeners reports
//! programmatic interactions through [`report_activity`]. Publishing is
//! side-effect-free notification and never fails.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

type Callback = Arc<dyn Fn(Instant) + Send + Sync>;

#[derive(Default)]
struct SignalInner {
    latest: Mutex<Option<Instant>>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// Publish/subscribe channel for activity instants with a current-value
/// snapshot: a late subscriber immediately receives the most recent publish
/// so it can catch up.
#[derive(Clone, Default)]
pub struct ActivitySignal {
    inner: Arc<SignalInner>,
}

impl ActivitySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `at` as the current snapshot and notifies all subscribers.
    pub fn publish(&self, at: Instant) {
        if let Ok(mut latest) = self.inner.latest.lock() {
            *latest = Some(at);
        }

        // Callbacks run outside the subscriber lock so they may subscribe
        // or drop subscriptions themselves.
        let callbacks: Vec<Callback> = match self.inner.subscribers.lock() {
            Ok(subscribers) => subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(at);
        }
    }

    /// Registers `callback` and returns a guard that unsubscribes on drop.
    /// If a publish already happened, the callback is invoked once
    /// immediately with the snapshot value.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Instant) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.push((id, Arc::clone(&callback)));
        }

        let snapshot = self.latest();
        if let Some(at) = snapshot {
            callback(at);
        }

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Most recent published instant, if any.
    pub fn latest(&self) -> Option<Instant> {
        self.inner.latest.lock().map(|latest| *latest).unwrap_or(None)
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }
}

/// RAII handle for a signal subscription; dropping it removes the listener,
/// so every subscribe has a matching removal on every exit path.
pub struct Subscription {
    id: u64,
    inner: Weak<SignalInner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            if let Ok(mut subscribers) = inner.subscribers.lock() {
                subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

static GLOBAL_SIGNAL: Lazy<ActivitySignal> = Lazy::new(ActivitySignal::new);

/// The process-wide activity signal shared by all components.
pub fn activity_signal() -> &'static ActivitySignal {
    &GLOBAL_SIGNAL
}

/// Globally reachable activity report for programmatic interactions
/// (e.g. a navigation triggered by code rather than raw input).
pub fn report_activity() {
    GLOBAL_SIGNAL.publish(Instant::now());
}
