//! Study Timer - A Pomodoro timer service for students
//!
//! This library provides the timer state machine, the one-second tick driver,
//! and the completion handler that records focus sessions and study stats on
//! the backend.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{BackendError, TimerError};
pub use state::AppState;
pub use api::create_router;
pub use tasks::{CompletionHandler, TickDriver};
pub use utils::signals::shutdown_signal;
