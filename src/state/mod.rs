//! State management module
//! 
//! This module contains the cycle timer, its phase schedule, and the shared
//! application state that owns them.

pub mod phase;
pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use phase::{Phase, PhaseConfig};
pub use app_state::AppState;
pub use timer_state::{TickOutcome, TimerSnapshot, TimerState};
