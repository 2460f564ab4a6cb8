//! Unlock credential flow.
//!
//! Orchestrates whichever credential method is available and calls the
//! external verification service. Verification and haptics are the only
//! suspension points in the subsystem; the flow awaits them before driving
//! the state machine, so `unlock_success` never runs ahead of a pending
//! verification.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{AutolockError, Result, WRONG_PASSWORD_MESSAGE};
use crate::state::LockStateMachine;

/// External password verification backend. The cryptography behind it is
/// someone else's problem; this subsystem only sees accept/reject.
#[derive(Debug, thiserror::Error)]
#[error("verification service unavailable: {reason}")]
pub struct VerifyServiceError {
    pub reason: String,
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// A transient service failure is an `Err`; callers treat it exactly
    /// like a rejection (fail closed, never open).
    async fn verify_password(&self, candidate: &str) -> std::result::Result<bool, VerifyServiceError>;
}

/// Best-effort success feedback. Failures are swallowed; nothing is
/// surfaced to the user.
#[async_trait]
pub trait HapticFeedback: Send + Sync {
    async fn unlock_succeeded(&self);
}

/// Haptics for hosts without a feedback capability.
pub struct NoHaptics;

#[async_trait]
impl HapticFeedback for NoHaptics {
    async fn unlock_succeeded(&self) {}
}

/// One instance per rendered password form. Allows exactly one outstanding
/// verification call at a time; no lockout or backoff is applied to
/// repeated failures, the user simply resubmits.
pub struct UnlockCredentialFlow {
    machine: Arc<Mutex<LockStateMachine>>,
    verifier: Arc<dyn CredentialVerifier>,
    haptics: Arc<dyn HapticFeedback>,
    in_flight: bool,
    error: Option<&'static str>,
}

impl UnlockCredentialFlow {
    pub fn new(
        machine: Arc<Mutex<LockStateMachine>>,
        verifier: Arc<dyn CredentialVerifier>,
        haptics: Arc<dyn HapticFeedback>,
    ) -> Self {
        Self {
            machine,
            verifier,
            haptics,
            in_flight: false,
            error: None,
        }
    }

    /// Submits a password candidate to the verification service. On
    /// rejection (or an unreachable service) the session stays locked and a
    /// generic error is surfaced; on acceptance the machine transitions to
    /// unlocked after the success haptic fires.
    pub async fn submit_password(&mut self, candidate: &str) -> Result<()> {
        if self.in_flight {
            return Err(AutolockError::SubmissionInFlight);
        }

        self.in_flight = true;
        let verdict = self.verifier.verify_password(candidate).await;
        self.in_flight = false;

        match verdict {
            Ok(true) => {
                self.error = None;
                self.haptics.unlock_succeeded().await;
                match self.machine.lock() {
                    Ok(mut machine) => machine.unlock_success(),
                    Err(_) => Err(AutolockError::VerificationUnavailable),
                }
            }
            Ok(false) => {
                self.error = Some(WRONG_PASSWORD_MESSAGE);
                Err(AutolockError::CredentialRejected)
            }
            Err(err) => {
                tracing::warn!(error = %err, "verification service unavailable; failing closed");
                self.error = Some(WRONG_PASSWORD_MESSAGE);
                Err(AutolockError::VerificationUnavailable)
            }
        }
    }

    /// The user edited the input; any stale error disappears immediately.
    pub fn input_edited(&mut self) {
        self.error = None;
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}
