//! Global hotkey registration
//!
//! One compiled-in binding toggles the agent regardless of which
//! application has focus. The OS-level callback only forwards a command
//! into the controller queue; state is never touched from the hotkey
//! thread.

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::{info, warn};

use crate::controller::{Command, ControllerHandle};

/// Register the toggle hotkey (Super+Shift+J).
///
/// Returns the manager, which must be kept alive for the registration to
/// persist. Failure is non-fatal: the agent stays controllable through its
/// other surfaces, so we log one warning and return `None`.
pub fn register_toggle_hotkey(handle: &ControllerHandle) -> Option<GlobalHotKeyManager> {
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            warn!("Global hotkey unavailable: {}", e);
            return None;
        }
    };

    let hotkey = HotKey::new(Some(Modifiers::SUPER | Modifiers::SHIFT), Code::KeyJ);
    if let Err(e) = manager.register(hotkey) {
        warn!("Failed to register toggle hotkey: {}", e);
        return None;
    }

    let commands = handle.commands();
    GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
        if event.id == hotkey.id() && event.state == HotKeyState::Pressed {
            let _ = commands.send(Command::Toggle);
        }
    }));

    info!("Toggle hotkey registered: Super+Shift+J");
    Some(manager)
}
