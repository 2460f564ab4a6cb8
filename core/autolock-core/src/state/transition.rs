//! Pure transition rules for the lock state machine.
//! Returns `None` for operations that are invalid in the current state; the
//! machine rejects those without touching any side effects.

use super::types::{CredentialSlide, LockOp, LockState};

pub fn next_state(current: LockState, op: LockOp) -> Option<LockState> {
    match (current, op) {
        (LockState::Unlocked, LockOp::Lock { preferred }) => {
            Some(LockState::Locked { slide: preferred })
        }
        (LockState::Locked { .. }, LockOp::Lock { .. }) => None,

        (LockState::Locked { .. }, LockOp::UnlockSucceeded) => Some(LockState::Unlocked),
        (LockState::Unlocked, LockOp::UnlockSucceeded) => None,

        (
            LockState::Locked {
                slide: CredentialSlide::BiometricPrompt,
            },
            LockOp::SwitchToPasswordForm,
        ) => Some(LockState::Locked {
            slide: CredentialSlide::PasswordForm,
        }),
        (_, LockOp::SwitchToPasswordForm) => None,

        // Backgrounding resets a password form back to the biometric prompt
        // so the faster method is retried on the next foreground. Every
        // other state is left untouched.
        (
            LockState::Locked {
                slide: CredentialSlide::PasswordForm,
            },
            LockOp::EnteredBackground,
        ) => Some(LockState::Locked {
            slide: CredentialSlide::BiometricPrompt,
        }),
        (current, LockOp::EnteredBackground) => Some(current),
    }
}
