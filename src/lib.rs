//! Unidle - A state-managed background agent to keep the system awake
//!
//! This library provides a command-driven activity controller that defeats
//! idle detection by synthesizing mouse input on a countdown, holding an
//! idle-sleep assertion while active.

pub mod config;
pub mod controller;
pub mod hotkey;
pub mod platform;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use controller::{Command, Controller, ControllerHandle};
pub use state::ActivityState;
pub use utils::signals::shutdown_signal;
