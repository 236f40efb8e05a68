//! Traffic Light - A state-managed HTTP server running a cycle timer
//! 
//! This library provides the red/green/yellow cycle timer, the background
//! tick loop that drives it, and the HTTP control surface around it.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Phase, TimerState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
