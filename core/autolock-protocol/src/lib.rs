//! Delegation channel messages for the session autolock controller.
//!
//! This crate is shared by the primary context and any delegated overlay
//! contexts to prevent schema drift. The primary remains the authority on
//! lock state; delegated contexts can only report activity upward and apply
//! the commands the primary broadcasts downward.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound on context ids; anything longer is a bug in the caller.
const MAX_CONTEXT_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unsupported protocol version {0}")]
    VersionMismatch(u32),

    #[error("context_id is required")]
    MissingContextId,

    #[error("context_id must be {MAX_CONTEXT_ID_LEN} characters or fewer")]
    ContextIdTooLong,

    #[error("recorded_at must be RFC3339")]
    InvalidTimestamp,
}

/// Delegated context → primary: "user was active over here just now."
///
/// The wall-clock timestamp is diagnostic only; the primary applies the
/// report against its own monotonic clock at receipt time, so clock skew
/// between contexts cannot move the idle deadline backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityReport {
    pub context_id: String,
    pub recorded_at: String,
}

impl ActivityReport {
    pub fn now(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            recorded_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.context_id.trim().is_empty() {
            return Err(ProtocolError::MissingContextId);
        }
        if self.context_id.len() > MAX_CONTEXT_ID_LEN {
            return Err(ProtocolError::ContextIdTooLong);
        }
        if DateTime::parse_from_rfc3339(&self.recorded_at).is_err() {
            return Err(ProtocolError::InvalidTimestamp);
        }
        Ok(())
    }
}

/// Primary → delegated: lock-state and overlay-visibility broadcasts.
///
/// A delegated context never computes lock state of its own; it applies
/// these verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockCommand {
    Lock,
    Unlock,
    ShowOverlay,
    HideOverlay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationPayload {
    Activity(ActivityReport),
    Command(LockCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelegationMessage {
    pub protocol_version: u32,
    pub payload: DelegationPayload,
}

impl DelegationMessage {
    pub fn activity(report: ActivityReport) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            payload: DelegationPayload::Activity(report),
        }
    }

    pub fn command(command: LockCommand) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            payload: DelegationPayload::Command(command),
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(ProtocolError::VersionMismatch(self.protocol_version));
        }
        match &self.payload {
            DelegationPayload::Activity(report) => report.validate(),
            DelegationPayload::Command(_) => Ok(()),
        }
    }
}
