//! Split-context delegation bridge.
//!
//! When the application runs split across a primary window and a detached
//! overlay context, only the primary owns the authoritative activity clock
//! and the autolock timer. The delegated side forwards throttled activity
//! upward and applies lock commands downward; coordination is message
//! passing only, never shared state.
//!
//! Either side may go away at any time. A dead peer makes sends silently
//! drop (logged at debug), which is exactly the required behavior: losing
//! the overlay must not disturb the primary's timer, and losing the primary
//! just means the next forwarded event goes nowhere.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use autolock_protocol::{ActivityReport, DelegationMessage, DelegationPayload, LockCommand};

use crate::clock::ActivityClock;
use crate::signal::ActivitySignal;
use crate::state::LockStateMachine;

/// Which side of the split this context is. Decided once at startup and
/// passed explicitly to every component that branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRole {
    Primary,
    Delegated,
}

/// Held by a delegated context; forwards activity to the primary.
#[derive(Clone)]
pub struct DelegationUplink {
    context_id: String,
    tx: Sender<DelegationMessage>,
}

impl DelegationUplink {
    /// Reports activity to the primary. A gone primary drops the report.
    pub fn forward_activity(&self) {
        let message = DelegationMessage::activity(ActivityReport::now(&self.context_id));
        if self.tx.send(message).is_err() {
            tracing::debug!(
                context_id = %self.context_id,
                "primary context gone; dropping activity report"
            );
        }
    }
}

/// Held by the primary; the only path by which delegated activity reaches
/// the authoritative clock.
pub struct PrimaryInbox {
    rx: Receiver<DelegationMessage>,
    clock: Arc<ActivityClock>,
    signal: ActivitySignal,
}

impl PrimaryInbox {
    /// Applies queued activity reports in arrival order. Each valid report
    /// counts as activity at `now` (receipt time), so cross-context clock
    /// skew cannot move the idle deadline.
    pub fn drain(&self, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            if let Err(err) = message.validate() {
                tracing::warn!(error = %err, "dropping invalid delegation message");
                continue;
            }
            match message.payload {
                DelegationPayload::Activity(report) => {
                    tracing::debug!(context_id = %report.context_id, "delegated activity applied");
                    self.clock.touch(now);
                    self.signal.publish(now);
                    applied += 1;
                }
                DelegationPayload::Command(command) => {
                    tracing::warn!(?command, "lock command on uplink channel; ignoring");
                }
            }
        }
        applied
    }
}

/// Held by the primary machine; broadcasts lock commands to delegated
/// contexts.
#[derive(Clone)]
pub struct DownlinkSender {
    tx: Sender<DelegationMessage>,
}

impl DownlinkSender {
    pub fn send(&self, command: LockCommand) {
        if self.tx.send(DelegationMessage::command(command)).is_err() {
            tracing::debug!(?command, "delegated context gone; dropping lock command");
        }
    }
}

/// Held by a delegated context; applies primary broadcasts to its machine.
pub struct DelegatedInbox {
    rx: Receiver<DelegationMessage>,
}

impl DelegatedInbox {
    pub fn drain(&self, machine: &mut LockStateMachine) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            if let Err(err) = message.validate() {
                tracing::warn!(error = %err, "dropping invalid delegation message");
                continue;
            }
            match message.payload {
                DelegationPayload::Command(command) => {
                    machine.apply_command(command);
                    applied += 1;
                }
                DelegationPayload::Activity(report) => {
                    tracing::warn!(
                        context_id = %report.context_id,
                        "activity report on downlink channel; ignoring"
                    );
                }
            }
        }
        applied
    }
}

/// Builds the activity uplink between one delegated context and the primary.
pub fn delegation_pair(
    context_id: impl Into<String>,
    clock: Arc<ActivityClock>,
    signal: ActivitySignal,
) -> (DelegationUplink, PrimaryInbox) {
    let (tx, rx) = unbounded();
    (
        DelegationUplink {
            context_id: context_id.into(),
            tx,
        },
        PrimaryInbox { rx, clock, signal },
    )
}

/// Builds the lock-command downlink from the primary to one delegated
/// context.
pub fn command_pair() -> (DownlinkSender, DelegatedInbox) {
    let (tx, rx) = unbounded();
    (DownlinkSender { tx }, DelegatedInbox { rx })
}
