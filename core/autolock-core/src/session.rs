//! Subsystem wiring.
//!
//! `SessionLock` assembles the machine, clock, tracker, and timer for one
//! execution context and keeps teardown symmetric: the timer thread, the
//! global-signal subscription, and any attached input listeners all come
//! down on shutdown (or drop), on every exit path.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::bridge::{ContextRole, DelegationUplink, DownlinkSender};
use crate::clock::ActivityClock;
use crate::config::LockConfig;
use crate::signal::{ActivitySignal, Subscription};
use crate::state::{LockEffects, LockState, LockStateMachine};
use crate::timer::{AutolockTimer, TimerHandle};
use crate::tracker::{ActivityRoute, ActivityTracker, InputListeners, InteractionKind};

pub struct SessionLock {
    config: LockConfig,
    role: ContextRole,
    machine: Arc<Mutex<LockStateMachine>>,
    /// Authoritative last-activity clock; present only in the primary.
    clock: Option<Arc<ActivityClock>>,
    signal: ActivitySignal,
    tracker: Mutex<ActivityTracker>,
    timer: Option<TimerHandle>,
    /// Keeps programmatic `report_activity` calls feeding this session;
    /// dropped on shutdown.
    _signal_subscription: Option<Subscription>,
}

impl SessionLock {
    /// Wires up the primary context: owns the clock and, when eligible, the
    /// timer. `signal` is usually [`crate::signal::activity_signal`];
    /// `downlink` is present when running split-context.
    pub fn primary(
        config: LockConfig,
        effects: Box<dyn LockEffects>,
        signal: &ActivitySignal,
        downlink: Option<DownlinkSender>,
    ) -> Self {
        let clock = Arc::new(ActivityClock::new(Instant::now()));
        let machine = Arc::new(Mutex::new(LockStateMachine::new(
            config,
            ContextRole::Primary,
            effects,
            downlink,
        )));

        let subscription = {
            let clock = Arc::clone(&clock);
            signal.subscribe(move |at| clock.touch(at))
        };

        let tracker = ActivityTracker::new(ActivityRoute::Primary {
            clock: Arc::clone(&clock),
            signal: signal.clone(),
        });

        let mut session = Self {
            config,
            role: ContextRole::Primary,
            machine,
            clock: Some(clock),
            signal: signal.clone(),
            tracker: Mutex::new(tracker),
            timer: None,
            _signal_subscription: Some(subscription),
        };
        session.restart_timer();
        session
    }

    /// Wires up a delegated overlay context: no clock, no timer, activity
    /// forwarded through `uplink`.
    pub fn delegated(config: LockConfig, signal: &ActivitySignal, uplink: DelegationUplink) -> Self {
        let machine = Arc::new(Mutex::new(LockStateMachine::new(
            config,
            ContextRole::Delegated,
            Box::new(crate::state::NoopEffects),
            None,
        )));

        let subscription = {
            let uplink = uplink.clone();
            signal.subscribe(move |_| uplink.forward_activity())
        };

        let tracker = ActivityTracker::new(ActivityRoute::Delegated { uplink });

        Self {
            config,
            role: ContextRole::Delegated,
            machine,
            clock: None,
            signal: signal.clone(),
            tracker: Mutex::new(tracker),
            timer: None,
            _signal_subscription: Some(subscription),
        }
    }

    pub fn role(&self) -> ContextRole {
        self.role
    }

    /// Current lock state, for rendering decisions.
    pub fn state(&self) -> LockState {
        self.machine
            .lock()
            .map(|machine| machine.state())
            .unwrap_or(LockState::Unlocked)
    }

    /// Shared machine handle for wiring the unlock flow and delegation
    /// inboxes.
    pub fn machine(&self) -> Arc<Mutex<LockStateMachine>> {
        Arc::clone(&self.machine)
    }

    /// Primary clock handle, e.g. for a [`crate::bridge::PrimaryInbox`].
    pub fn clock(&self) -> Option<Arc<ActivityClock>> {
        self.clock.as_ref().map(Arc::clone)
    }

    pub fn signal(&self) -> &ActivitySignal {
        &self.signal
    }

    /// Feeds one raw input event through the throttle.
    pub fn observe_input(&self, kind: InteractionKind, now: Instant) -> bool {
        self.tracker
            .lock()
            .map(|mut tracker| tracker.observe(kind, now))
            .unwrap_or(false)
    }

    pub fn register_input(&self, listeners: &mut dyn InputListeners) {
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.register(listeners);
        }
    }

    pub fn teardown_input(&self, listeners: &mut dyn InputListeners) {
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.teardown(listeners);
        }
    }

    pub fn on_background(&self) {
        if let Ok(mut machine) = self.machine.lock() {
            machine.on_background();
        }
    }

    pub fn on_foreground(&self) {
        if let Ok(mut machine) = self.machine.lock() {
            machine.on_foreground();
        }
    }

    /// Applies an externally changed configuration snapshot. Disabling
    /// autolock (a "never" period or a hardware-backed account) forces the
    /// session unlocked and suppresses the timer; enabling it starts one.
    pub fn update_config(&mut self, config: LockConfig) {
        self.config = config;
        if let Ok(mut machine) = self.machine.lock() {
            machine.set_config(config);
            if !config.autolock_enabled() && machine.state().is_locked() {
                // Runs the unlock side effects so the overlay comes down.
                if let Err(err) = machine.unlock_success() {
                    tracing::warn!(error = %err, "failed to unlock after config change");
                }
            }
        }
        self.restart_timer();
        tracing::info!(autolock = ?config.autolock, "lock configuration updated");
    }

    /// Stops the timer and drops the signal subscription. Input listener
    /// teardown still needs the host's listener capability; call
    /// [`Self::teardown_input`] before this.
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
        self._signal_subscription = None;
    }

    fn restart_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
        if !AutolockTimer::should_run(&self.config, self.role) {
            return;
        }
        let (Some(clock), Some(period)) = (self.clock.as_ref(), self.config.autolock.duration())
        else {
            return;
        };
        let timer = AutolockTimer::new(Arc::clone(clock), Arc::clone(&self.machine), period);
        self.timer = Some(timer.spawn());
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.shutdown();
    }
}
