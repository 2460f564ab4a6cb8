//! Lock state machine.
//!
//! One `LockState` exists per application session, owned by
//! [`LockStateMachine`] and mutated only through its transition operations.
//! The transition rules themselves are a pure function in [`transition`] so
//! they can be tested exhaustively without wiring up collaborators.
//!
//! - [`types`]: `LockState`, `CredentialSlide`, and the operation enum
//! - [`transition`]: pure `next_state` rules
//! - [`machine`]: side-effect sequencing around the pure core

pub(crate) mod machine;
pub(crate) mod transition;
pub(crate) mod types;

pub use machine::{LockEffects, LockStateMachine, NoopEffects};
pub use transition::next_state;
pub use types::{CredentialSlide, LockOp, LockState};
