//! Error types for the autolock subsystem.
//! Nothing here is fatal to the host application: every failure degrades to
//! "remain locked" or "show error, allow retry".

use crate::tracker::InteractionKind;

/// Message surfaced for any failed unlock attempt. Deliberately generic; it
/// never discloses which check failed.
pub const WRONG_PASSWORD_MESSAGE: &str = "Wrong password. Please try again.";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AutolockError {
    /// Wrong password or biometric. Recovered locally; the user is
    /// re-prompted with [`WRONG_PASSWORD_MESSAGE`].
    #[error("credential rejected")]
    CredentialRejected,

    /// Verification backend unreachable. Fails closed: indistinguishable
    /// from a rejection at the UI surface.
    #[error("verification service unavailable")]
    VerificationUnavailable,

    /// A password submission is already awaiting verification on this form.
    #[error("a verification call is already in flight")]
    SubmissionInFlight,

    /// Host refused a raw input listener. Not retried.
    #[error("failed to register {kind:?} listener")]
    ListenerRegistration { kind: InteractionKind },

    #[error("invalid lock transition: {op} from {from}")]
    InvalidTransition {
        from: &'static str,
        op: &'static str,
    },
}

/// Convenience alias for Results using AutolockError.
pub type Result<T> = std::result::Result<T, AutolockError>;
