//! Raw-input activity tracking.
//!
//! Listens for a fixed set of interaction signals at the host's outermost
//! capture phase (so nested UI cannot swallow them), throttles bursts down
//! to one propagated event per interval, and routes the result by context
//! role: the primary updates the authoritative clock and publishes on the
//! activity signal, a delegated context forwards upward and never owns a
//! clock of its own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bridge::DelegationUplink;
use crate::clock::ActivityClock;
use crate::error::AutolockError;
use crate::signal::ActivitySignal;

/// Minimum interval between propagated activity events.
pub const THROTTLE_INTERVAL: Duration = Duration::from_millis(5000);

/// The fixed set of interaction signals worth resetting the idle timer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    FocusRegain,
    PointerMove,
    Touch,
    Wheel,
    KeyPress,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 5] = [
        InteractionKind::FocusRegain,
        InteractionKind::PointerMove,
        InteractionKind::Touch,
        InteractionKind::Wheel,
        InteractionKind::KeyPress,
    ];
}

/// Host capability for attaching raw input listeners. Listeners must be
/// installed at the capture phase.
pub trait InputListeners {
    fn add_listener(&mut self, kind: InteractionKind) -> Result<(), AutolockError>;
    fn remove_listener(&mut self, kind: InteractionKind);
}

/// Where throttled activity goes.
pub enum ActivityRoute {
    Primary {
        clock: Arc<ActivityClock>,
        signal: ActivitySignal,
    },
    /// Delegated contexts forward instead of keeping local state; the
    /// authoritative clock lives with the primary.
    Delegated { uplink: DelegationUplink },
}

pub struct ActivityTracker {
    route: ActivityRoute,
    last_emit: Option<Instant>,
    attached: Vec<InteractionKind>,
}

impl ActivityTracker {
    pub fn new(route: ActivityRoute) -> Self {
        Self {
            route,
            last_emit: None,
            attached: Vec::new(),
        }
    }

    /// Attaches listeners for every interaction kind. Idempotent: calling
    /// twice without a teardown in between is a no-op. A host that refuses
    /// one kind does not abort the rest; the failure is unexpected and only
    /// logged in debug builds.
    pub fn register(&mut self, listeners: &mut dyn InputListeners) {
        if !self.attached.is_empty() {
            return;
        }
        for kind in InteractionKind::ALL {
            match listeners.add_listener(kind) {
                Ok(()) => self.attached.push(kind),
                Err(err) => {
                    if cfg!(debug_assertions) {
                        tracing::debug!(error = %err, ?kind, "listener registration failed");
                    }
                }
            }
        }
    }

    /// Removes exactly the listeners that were attached. Idempotent and
    /// symmetric with [`register`](Self::register).
    pub fn teardown(&mut self, listeners: &mut dyn InputListeners) {
        for kind in self.attached.drain(..) {
            listeners.remove_listener(kind);
        }
    }

    /// Feeds one raw interaction event through the throttle. Returns true
    /// if the event was propagated.
    pub fn observe(&mut self, kind: InteractionKind, now: Instant) -> bool {
        if let Some(last) = self.last_emit {
            if now.saturating_duration_since(last) < THROTTLE_INTERVAL {
                tracing::trace!(?kind, "activity throttled");
                return false;
            }
        }
        self.last_emit = Some(now);

        match &self.route {
            ActivityRoute::Primary { clock, signal } => {
                clock.touch(now);
                signal.publish(now);
            }
            ActivityRoute::Delegated { uplink } => {
                uplink.forward_activity();
            }
        }
        true
    }
}
