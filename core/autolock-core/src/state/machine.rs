//! Side-effect sequencing around the pure transition rules.
//!
//! The machine is the sole writer of the session's `LockState`. In a
//! delegated context it is a deliberate no-op: it never computes lock state
//! or drives lock UI there, it only applies the commands broadcast by the
//! primary.

use autolock_protocol::LockCommand;

use super::transition::next_state;
use super::types::{LockOp, LockState};
use crate::bridge::{ContextRole, DownlinkSender};
use crate::config::LockConfig;
use crate::error::{AutolockError, Result};

/// UI collaborators driven by lock transitions. All calls are best-effort
/// and fire-and-forget; implementations must not block.
pub trait LockEffects: Send {
    /// Present the lock overlay over the sensitive UI.
    fn show_lock_overlay(&mut self);
    /// Dismiss the lock overlay (the UI side runs its exit transition
    /// before actually removing the view).
    fn hide_lock_overlay(&mut self);
    /// Hide any in-app browser overlay while locked.
    fn hide_browser_overlay(&mut self);
    fn restore_browser_overlay(&mut self);
    /// Drop any cached "PIN accepted" marker from the previous unlock.
    fn clear_pin_accepted(&mut self);
}

/// Effects sink that does nothing; used by delegated contexts and tests.
#[derive(Debug, Default)]
pub struct NoopEffects;

impl LockEffects for NoopEffects {
    fn show_lock_overlay(&mut self) {}
    fn hide_lock_overlay(&mut self) {}
    fn hide_browser_overlay(&mut self) {}
    fn restore_browser_overlay(&mut self) {}
    fn clear_pin_accepted(&mut self) {}
}

pub struct LockStateMachine {
    state: LockState,
    config: LockConfig,
    role: ContextRole,
    effects: Box<dyn LockEffects>,
    /// Present only when running split-context as the primary.
    downlink: Option<DownlinkSender>,
    /// Delegated contexts defer their own visibility to primary broadcasts.
    surface_visible: bool,
}

impl LockStateMachine {
    pub fn new(
        config: LockConfig,
        role: ContextRole,
        effects: Box<dyn LockEffects>,
        downlink: Option<DownlinkSender>,
    ) -> Self {
        Self {
            state: config.initial_state(),
            config,
            role,
            effects,
            downlink,
            surface_visible: true,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn role(&self) -> ContextRole {
        self.role
    }

    /// Whether a delegated surface should currently render its content.
    pub fn surface_visible(&self) -> bool {
        self.surface_visible
    }

    /// Hides the sensitive UI behind the lock screen. Valid only in the
    /// primary context while autolock applies to this account.
    pub fn lock(&mut self) -> Result<()> {
        if self.role == ContextRole::Delegated {
            return Ok(());
        }
        if !self.config.autolock_enabled() {
            return Err(AutolockError::InvalidTransition {
                from: self.state.name(),
                op: "lock",
            });
        }

        let preferred = self.config.preferred_slide();
        self.apply(LockOp::Lock { preferred })?;

        self.effects.show_lock_overlay();
        self.effects.hide_browser_overlay();
        self.broadcast(LockCommand::Lock);
        self.broadcast(LockCommand::HideOverlay);
        tracing::info!(slide = ?preferred, "session locked");
        Ok(())
    }

    /// Completes a successful credential verification.
    pub fn unlock_success(&mut self) -> Result<()> {
        if self.role == ContextRole::Delegated {
            return Ok(());
        }
        self.apply(LockOp::UnlockSucceeded)?;

        self.effects.hide_lock_overlay();
        self.effects.restore_browser_overlay();
        self.effects.clear_pin_accepted();
        self.broadcast(LockCommand::Unlock);
        self.broadcast(LockCommand::ShowOverlay);
        tracing::info!("session unlocked");
        Ok(())
    }

    /// User opted out of the biometric prompt in favor of the password form.
    pub fn switch_to_password_form(&mut self) -> Result<()> {
        if self.role == ContextRole::Delegated {
            return Ok(());
        }
        self.apply(LockOp::SwitchToPasswordForm)
    }

    /// Host reported the app is entering background. Never fails; states
    /// without a background rule are left untouched.
    pub fn on_background(&mut self) {
        if self.role == ContextRole::Delegated {
            return;
        }
        if let Some(next) = next_state(self.state, LockOp::EnteredBackground) {
            if next != self.state {
                tracing::debug!(from = self.state.name(), "background reset to biometric prompt");
            }
            self.state = next;
        }
    }

    /// Host reported a return to foreground. No state change today; kept as
    /// an explicit hook so hosts wire both directions symmetrically.
    pub fn on_foreground(&mut self) {}

    /// Applies a primary broadcast in a delegated context. Primary contexts
    /// author these commands and never consume them.
    pub fn apply_command(&mut self, command: LockCommand) {
        if self.role == ContextRole::Primary {
            tracing::warn!(?command, "primary context ignoring inbound lock command");
            return;
        }
        match command {
            LockCommand::Lock => {
                self.state = LockState::Locked {
                    slide: self.config.preferred_slide(),
                };
            }
            LockCommand::Unlock => {
                self.state = LockState::Unlocked;
            }
            LockCommand::ShowOverlay => {
                self.surface_visible = true;
            }
            LockCommand::HideOverlay => {
                self.surface_visible = false;
            }
        }
        tracing::debug!(?command, state = self.state.name(), "applied primary lock command");
    }

    pub(crate) fn set_config(&mut self, config: LockConfig) {
        self.config = config;
    }

    fn apply(&mut self, op: LockOp) -> Result<()> {
        match next_state(self.state, op) {
            Some(next) => {
                self.state = next;
                Ok(())
            }
            None => {
                tracing::warn!(
                    from = self.state.name(),
                    op = op.name(),
                    "rejected invalid lock transition"
                );
                Err(AutolockError::InvalidTransition {
                    from: self.state.name(),
                    op: op.name(),
                })
            }
        }
    }

    fn broadcast(&self, command: LockCommand) {
        if let Some(downlink) = &self.downlink {
            downlink.send(command);
        }
    }
}
