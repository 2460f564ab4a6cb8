//! Periodic idle check.
//!
//! A coarse recurring check compares elapsed idle time against the
//! configured autolock period and triggers the lock transition. The check
//! cadence is deliberately coarser than the threshold: locking may land up
//! to one interval late, which is an accepted bound. The check itself never
//! fails; a missed tick just delays locking to the next one.

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::bridge::ContextRole;
use crate::clock::ActivityClock;
use crate::config::LockConfig;
use crate::state::LockStateMachine;

/// Fixed cadence of the idle check.
pub const CHECK_INTERVAL: Duration = Duration::from_millis(5000);

pub struct AutolockTimer {
    clock: Arc<ActivityClock>,
    machine: Arc<Mutex<LockStateMachine>>,
    period: Duration,
}

impl AutolockTimer {
    /// The timer runs only in the primary context, and not at all for a
    /// "never" period or a hardware-backed account.
    pub fn should_run(config: &LockConfig, role: ContextRole) -> bool {
        role == ContextRole::Primary && config.autolock_enabled()
    }

    pub fn new(
        clock: Arc<ActivityClock>,
        machine: Arc<Mutex<LockStateMachine>>,
        period: Duration,
    ) -> Self {
        Self {
            clock,
            machine,
            period,
        }
    }

    /// One idle check at `now`. Locks when the session is unlocked and idle
    /// time strictly exceeds the configured period.
    pub fn check(&self, now: Instant) {
        let idle = self.clock.idle_for(now);
        if idle <= self.period {
            return;
        }
        if let Ok(mut machine) = self.machine.lock() {
            if machine.state().is_locked() {
                return;
            }
            tracing::info!(idle_secs = idle.as_secs(), "idle threshold exceeded");
            if let Err(err) = machine.lock() {
                tracing::warn!(error = %err, "idle check could not lock");
            }
        }
    }

    /// Starts the recurring check on a background thread. The returned
    /// handle stops it deterministically; the stop channel doubles as the
    /// tick timeout so shutdown never waits out a full interval.
    pub fn spawn(self) -> TimerHandle {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let thread = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(CHECK_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => self.check(Instant::now()),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        TimerHandle {
            stop_tx,
            thread: Some(thread),
        }
    }
}

/// Owns the timer thread; stopping (or dropping) joins it.
pub struct TimerHandle {
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("autolock timer thread panicked");
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
