//! Lock state and transition operation types.

use serde::{Deserialize, Serialize};

/// The currently displayed unlock method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSlide {
    BiometricPrompt,
    PasswordForm,
}

/// Whether the sensitive UI is hidden behind the lock screen.
/// Exposed to the rest of the application for rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LockState {
    Unlocked,
    Locked { slide: CredentialSlide },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }

    pub fn slide(&self) -> Option<CredentialSlide> {
        match self {
            LockState::Unlocked => None,
            LockState::Locked { slide } => Some(*slide),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            LockState::Unlocked => "unlocked",
            LockState::Locked { .. } => "locked",
        }
    }
}

/// Transition operations applied to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOp {
    Lock { preferred: CredentialSlide },
    UnlockSucceeded,
    SwitchToPasswordForm,
    EnteredBackground,
}

impl LockOp {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            LockOp::Lock { .. } => "lock",
            LockOp::UnlockSucceeded => "unlock_succeeded",
            LockOp::SwitchToPasswordForm => "switch_to_password_form",
            LockOp::EnteredBackground => "entered_background",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_state_reports_slide() {
        let state = LockState::Locked {
            slide: CredentialSlide::PasswordForm,
        };
        assert!(state.is_locked());
        assert_eq!(state.slide(), Some(CredentialSlide::PasswordForm));
        assert_eq!(LockState::Unlocked.slide(), None);
    }

    #[test]
    fn lock_state_serializes_with_tag() {
        let json = serde_json::to_string(&LockState::Locked {
            slide: CredentialSlide::BiometricPrompt,
        })
        .expect("serialize");
        assert_eq!(json, "{\"state\":\"locked\",\"slide\":\"biometric_prompt\"}");
    }
}
