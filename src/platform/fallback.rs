//! Logging no-op driver and guard for targets without a supported backend.
//!
//! Keeps the binary buildable and the controller testable on Linux/Windows
//! CI hosts. Every request is accepted and logged at debug level.

use super::{IdleGuard, InputDriver, PlatformError, PointerAction};

/// Accepts every pointer action without touching any OS API.
pub struct LoggingInputDriver;

impl LoggingInputDriver {
    pub fn new() -> Self {
        LoggingInputDriver
    }
}

impl InputDriver for LoggingInputDriver {
    fn perform(&mut self, action: &PointerAction) -> Result<(), PlatformError> {
        tracing::debug!("input driver (no-op): {:?}", action);
        Ok(())
    }
}

/// Tracks held/released without creating any OS assertion.
pub struct LoggingIdleGuard {
    held: bool,
}

impl LoggingIdleGuard {
    pub fn new() -> Self {
        Self { held: false }
    }
}

impl IdleGuard for LoggingIdleGuard {
    fn acquire(&mut self, reason: &str) -> Result<(), PlatformError> {
        if !self.held {
            tracing::debug!("idle guard (no-op): acquire for {:?}", reason);
            self.held = true;
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.held {
            tracing::debug!("idle guard (no-op): release");
            self.held = false;
        }
    }
}
