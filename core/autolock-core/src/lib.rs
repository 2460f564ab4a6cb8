//! # autolock-core
//!
//! Session autolock controller: decides when the application's sensitive UI
//! must hide behind the lock screen, tracks user activity to reset the idle
//! timer, and coordinates unlock via password or biometric credential.
//!
//! ```text
//! raw input ──▶ ActivityTracker ──▶ ActivitySignal / DelegationBridge
//!                                            │
//!                                            ▼
//!                                     ActivityClock (primary only)
//!                                            │
//!              AutolockTimer ── idle ≥ period?
//!                                            │
//!                                            ▼
//!                        LockStateMachine ──▶ lock overlay effects
//!                                            ▲
//!                      UnlockCredentialFlow ─┘ (verify, then unlock)
//! ```
//!
//! ## Design principles
//!
//! - **Single writer**: one context (the primary) owns the authoritative
//!   activity clock and the timer; delegated overlay contexts only forward
//!   activity and mirror lock commands.
//! - **Pure transitions**: the lock rules live in a pure function; side
//!   effects are sequenced around it, never inside it.
//! - **Fail closed**: an unreachable verification service looks exactly
//!   like a wrong password. Nothing in this crate is fatal to the host.
//! - **Symmetric teardown**: every listener, subscription, and timer comes
//!   down with its owner, on every exit path.

pub mod bridge;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;
pub mod signal;
pub mod state;
pub mod timer;
pub mod tracker;
pub mod unlock;

#[cfg(feature = "debug-commands")]
pub mod debug;

// Re-export commonly used items at crate root
pub use bridge::{
    command_pair, delegation_pair, ContextRole, DelegatedInbox, DelegationUplink, DownlinkSender,
    PrimaryInbox,
};
pub use clock::ActivityClock;
pub use config::{AuthMethod, AutolockPeriod, LockConfig};
pub use error::{AutolockError, Result, WRONG_PASSWORD_MESSAGE};
pub use session::SessionLock;
pub use signal::{activity_signal, report_activity, ActivitySignal, Subscription};
pub use state::{CredentialSlide, LockEffects, LockState, LockStateMachine, NoopEffects};
pub use timer::{AutolockTimer, TimerHandle, CHECK_INTERVAL};
pub use tracker::{
    ActivityRoute, ActivityTracker, InputListeners, InteractionKind, THROTTLE_INTERVAL,
};
pub use unlock::{
    CredentialVerifier, HapticFeedback, NoHaptics, UnlockCredentialFlow, VerifyServiceError,
};
