//! Read-only configuration snapshot consumed by the autolock subsystem.
//!
//! Settings live elsewhere in the application; this crate only sees an
//! immutable snapshot and is handed a fresh one via
//! [`crate::session::SessionLock::update_config`] when the user changes
//! their settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::state::{CredentialSlide, LockState};

/// Configured idle threshold after which the session locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutolockPeriod {
    /// Sentinel: autolock disabled, the timer is never started.
    Never,
    Minutes1,
    #[default]
    Minutes5,
    Minutes15,
    Hours1,
    Hours4,
}

impl AutolockPeriod {
    /// Idle threshold, or `None` for [`AutolockPeriod::Never`].
    pub fn duration(self) -> Option<Duration> {
        match self {
            AutolockPeriod::Never => None,
            AutolockPeriod::Minutes1 => Some(Duration::from_secs(60)),
            AutolockPeriod::Minutes5 => Some(Duration::from_secs(5 * 60)),
            AutolockPeriod::Minutes15 => Some(Duration::from_secs(15 * 60)),
            AutolockPeriod::Hours1 => Some(Duration::from_secs(60 * 60)),
            AutolockPeriod::Hours4 => Some(Duration::from_secs(4 * 60 * 60)),
        }
    }
}

/// How the user unlocks the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    Password,
    /// OS-level biometrics gate the whole app, so the lock screen never
    /// shows a biometric slide for them.
    NativeBiometrics,
    /// App-driven biometrics; eligible for the biometric prompt slide.
    PlatformBiometrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    pub autolock: AutolockPeriod,
    pub auth: AuthMethod,
    /// Key material lives in external hardware; software autolock is
    /// suppressed entirely for such accounts.
    #[serde(default)]
    pub hardware_backed: bool,
    /// Whether the host platform can background the app. Drives the
    /// biometric-slide choice.
    #[serde(default)]
    pub background_capable: bool,
}

impl LockConfig {
    pub fn autolock_enabled(&self) -> bool {
        !self.hardware_backed && self.autolock != AutolockPeriod::Never
    }

    /// State the machine starts in: locked iff autolock applies at all.
    pub fn initial_state(&self) -> LockState {
        if self.autolock_enabled() {
            LockState::Locked {
                slide: self.preferred_slide(),
            }
        } else {
            LockState::Unlocked
        }
    }

    /// Credential slide shown first whenever the session locks.
    pub fn preferred_slide(&self) -> CredentialSlide {
        if self.auth == AuthMethod::PlatformBiometrics && self.background_capable {
            CredentialSlide::BiometricPrompt
        } else {
            CredentialSlide::PasswordForm
        }
    }
}
