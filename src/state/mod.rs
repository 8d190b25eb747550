//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod activity_state;

// Re-export main types
pub use activity_state::{ActivityState, Direction};
