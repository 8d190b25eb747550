//! Platform abstraction layer
//!
//! Defines the `InputDriver` and `IdleGuard` traits the controller calls
//! through. The macOS implementation talks to CoreGraphics and IOKit;
//! every other target gets a logging no-op pair so the state machine stays
//! fully testable off-macOS.

#[cfg(target_os = "macos")]
pub mod macos;

pub mod fallback;

use thiserror::Error;

/// Errors surfaced by platform calls.
///
/// The controller never treats these as fatal; they are logged and the
/// countdown continues.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("operation not supported on this platform")]
    Unsupported,
    #[error("{call} failed with code {code}")]
    Api { call: &'static str, code: i32 },
    #[error("{0}")]
    Other(String),
}

/// One synthetic pointer action, selected by the action policy at expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Warp the cursor by a relative offset, clamped to screen bounds
    Move { dx: f64, dy: f64 },
    /// Post a left mouse-down/up pair at the current position
    Click,
}

/// Synthesizes pointer events into the OS input pipeline.
pub trait InputDriver: Send {
    fn perform(&mut self, action: &PointerAction) -> Result<(), PlatformError>;
}

/// Holds an OS assertion preventing idle sleep while active.
///
/// At most one assertion is outstanding: `acquire` while held and `release`
/// while not held are no-ops.
pub trait IdleGuard: Send {
    fn acquire(&mut self, reason: &str) -> Result<(), PlatformError>;
    fn release(&mut self);
}

/// Build the input driver for the current target.
pub fn default_driver() -> Box<dyn InputDriver> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::QuartzInputDriver::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(fallback::LoggingInputDriver::new())
    }
}

/// Build the idle-sleep guard for the current target.
pub fn default_guard() -> Box<dyn IdleGuard> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::PowerAssertionGuard::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(fallback::LoggingIdleGuard::new())
    }
}
