//! macOS input synthesis and sleep suppression.
//!
//! `QuartzInputDriver` warps or clicks the cursor through CoreGraphics:
//! cursor moves use `CGWarpMouseCursorPosition` and clicks are posted as a
//! left-button down/up pair via `CGEventPost`. Both are synchronous calls
//! that deliver before returning, so no background thread is needed.
//! `PowerAssertionGuard` holds an IOKit power assertion that blocks
//! automatic display sleep while the agent is active.

use std::ffi::c_void;

use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};

use super::{IdleGuard, InputDriver, PlatformError, PointerAction};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// CGEventTapLocation: kCGSessionEventTap -- post into the current login
/// session, downstream of hardware-level taps.
const CG_SESSION_EVENT_TAP: u32 = 1;

/// kCGEventSourceStateHIDSystemState = 1 -- use the real HID hardware state.
const CG_EVENT_SOURCE_STATE_HID_SYSTEM_STATE: i32 = 1;

/// kCGEventLeftMouseDown / kCGEventLeftMouseUp.
const CG_EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const CG_EVENT_LEFT_MOUSE_UP: u32 = 2;

/// kCGMouseButtonLeft.
const CG_MOUSE_BUTTON_LEFT: u32 = 0;

/// kIOPMAssertionLevelOn.
const IOPM_ASSERTION_LEVEL_ON: u32 = 255;

/// kIOReturnSuccess.
const IO_RETURN_SUCCESS: i32 = 0;

/// Assertion type: display stays on while we are nudging the cursor.
const ASSERTION_TYPE: &str = "PreventUserIdleDisplaySleep";

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

type CGEventRef = *mut c_void;
type CGEventSourceRef = *mut c_void;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventSourceCreate(state_id: i32) -> CGEventSourceRef;
    fn CGEventCreate(source: CGEventSourceRef) -> CGEventRef;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventCreateMouseEvent(
        source: CGEventSourceRef,
        mouse_type: u32,
        mouse_cursor_position: CGPoint,
        mouse_button: u32,
    ) -> CGEventRef;
    fn CGEventPost(tap_location: u32, event: CGEventRef);
    fn CGWarpMouseCursorPosition(new_cursor_position: CGPoint) -> i32;
    fn CGMainDisplayID() -> u32;
    fn CGDisplayPixelsWide(display: u32) -> usize;
    fn CGDisplayPixelsHigh(display: u32) -> usize;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: *const c_void);
}

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOPMAssertionCreateWithName(
        assertion_type: CFStringRef,
        assertion_level: u32,
        assertion_name: CFStringRef,
        assertion_id: *mut u32,
    ) -> i32;
    fn IOPMAssertionRelease(assertion_id: u32) -> i32;
}

// ---------------------------------------------------------------------------
// Input driver
// ---------------------------------------------------------------------------

/// Synthesizes pointer events via CoreGraphics on macOS.
///
/// Stateless: each `perform()` call reads the cursor, posts or warps, and
/// releases every CF object it created before returning.
pub struct QuartzInputDriver;

impl QuartzInputDriver {
    pub fn new() -> Self {
        QuartzInputDriver
    }

    /// Read the current cursor position from a throwaway CGEvent.
    fn cursor_position(&self) -> Result<CGPoint, PlatformError> {
        unsafe {
            let event = CGEventCreate(std::ptr::null_mut());
            if event.is_null() {
                return Err(PlatformError::Other("CGEventCreate returned null".into()));
            }
            let location = CGEventGetLocation(event);
            CFRelease(event.cast::<c_void>());
            Ok(location)
        }
    }

    /// Warp the cursor by a relative offset, clamped to the main display.
    fn warp_by(&self, dx: f64, dy: f64) -> Result<(), PlatformError> {
        let current = self.cursor_position()?;
        let (width, height) = unsafe {
            let display = CGMainDisplayID();
            (
                CGDisplayPixelsWide(display) as f64,
                CGDisplayPixelsHigh(display) as f64,
            )
        };

        let target = CGPoint {
            x: (current.x + dx).clamp(0.0, width - 1.0),
            y: (current.y + dy).clamp(0.0, height - 1.0),
        };

        let code = unsafe { CGWarpMouseCursorPosition(target) };
        if code != 0 {
            return Err(PlatformError::Api {
                call: "CGWarpMouseCursorPosition",
                code,
            });
        }

        tracing::debug!("warped cursor to ({:.0}, {:.0})", target.x, target.y);
        Ok(())
    }

    /// Post a left mouse-down/up pair at the current cursor position.
    fn click(&self) -> Result<(), PlatformError> {
        let position = self.cursor_position()?;

        unsafe {
            let source = CGEventSourceCreate(CG_EVENT_SOURCE_STATE_HID_SYSTEM_STATE);
            if source.is_null() {
                return Err(PlatformError::Other(
                    "CGEventSourceCreate returned null".into(),
                ));
            }

            for mouse_type in [CG_EVENT_LEFT_MOUSE_DOWN, CG_EVENT_LEFT_MOUSE_UP] {
                let event =
                    CGEventCreateMouseEvent(source, mouse_type, position, CG_MOUSE_BUTTON_LEFT);
                if event.is_null() {
                    CFRelease(source.cast::<c_void>());
                    return Err(PlatformError::Other(
                        "CGEventCreateMouseEvent returned null".into(),
                    ));
                }
                CGEventPost(CG_SESSION_EVENT_TAP, event);
                CFRelease(event.cast::<c_void>());
            }

            CFRelease(source.cast::<c_void>());
        }

        tracing::debug!("posted click at ({:.0}, {:.0})", position.x, position.y);
        Ok(())
    }
}

impl InputDriver for QuartzInputDriver {
    fn perform(&mut self, action: &PointerAction) -> Result<(), PlatformError> {
        match *action {
            PointerAction::Move { dx, dy } => self.warp_by(dx, dy),
            PointerAction::Click => self.click(),
        }
    }
}

// ---------------------------------------------------------------------------
// Idle-sleep guard
// ---------------------------------------------------------------------------

/// Prevents idle display sleep through an IOKit power assertion.
pub struct PowerAssertionGuard {
    assertion_id: Option<u32>,
}

impl PowerAssertionGuard {
    pub fn new() -> Self {
        Self { assertion_id: None }
    }
}

impl IdleGuard for PowerAssertionGuard {
    fn acquire(&mut self, reason: &str) -> Result<(), PlatformError> {
        if self.assertion_id.is_some() {
            return Ok(());
        }

        let assertion_type = CFString::new(ASSERTION_TYPE);
        let assertion_name = CFString::new(reason);
        let mut assertion_id: u32 = 0;

        let code = unsafe {
            IOPMAssertionCreateWithName(
                assertion_type.as_concrete_TypeRef(),
                IOPM_ASSERTION_LEVEL_ON,
                assertion_name.as_concrete_TypeRef(),
                &mut assertion_id,
            )
        };

        if code != IO_RETURN_SUCCESS {
            return Err(PlatformError::Api {
                call: "IOPMAssertionCreateWithName",
                code,
            });
        }

        tracing::debug!("acquired power assertion {}", assertion_id);
        self.assertion_id = Some(assertion_id);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(assertion_id) = self.assertion_id.take() {
            let code = unsafe { IOPMAssertionRelease(assertion_id) };
            if code != IO_RETURN_SUCCESS {
                tracing::warn!("IOPMAssertionRelease({}) returned {}", assertion_id, code);
            } else {
                tracing::debug!("released power assertion {}", assertion_id);
            }
        }
    }
}

impl Drop for PowerAssertionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
