//! Debug commands for non-production builds.
//!
//! Injected explicitly behind the `debug-commands` feature; there is no
//! ambient global hook to trip over in release builds.

use std::time::Duration;

use crate::error::Result;
use crate::session::SessionLock;

pub struct DebugCommands<'a> {
    session: &'a SessionLock,
}

impl<'a> DebugCommands<'a> {
    pub fn new(session: &'a SessionLock) -> Self {
        Self { session }
    }

    /// Locks the session immediately, as if the idle threshold had passed.
    pub fn force_lock(&self) -> Result<()> {
        match self.session.machine().lock() {
            Ok(mut machine) => machine.lock(),
            Err(_) => Ok(()),
        }
    }

    /// Rewinds the activity clock so the next timer check sees at least
    /// `idle` of inactivity. Primary contexts only; elsewhere a no-op.
    pub fn force_idle(&self, idle: Duration) {
        if let Some(clock) = self.session.clock() {
            clock.rewind(idle);
        }
    }
}
