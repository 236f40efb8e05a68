//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod display;
pub mod scheduler;

// Re-export main functions
pub use display::display_task;
pub use scheduler::{tick_loop_task, FrameScheduler, IntervalScheduler};
