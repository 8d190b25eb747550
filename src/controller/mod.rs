//! Activity controller module
//!
//! The core of the agent: the command-driven state machine, its countdown
//! scheduler, and the action policy it applies at expiry.

pub mod controller;
pub mod countdown;
pub mod policy;

// Re-export main types
pub use controller::{Command, Controller, ControllerHandle};
pub use countdown::Countdown;
pub use policy::ActionPolicy;
