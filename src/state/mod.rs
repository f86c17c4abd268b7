//! State management module
//!
//! This module contains the timer state machine, the session records it
//! produces, and the shared application state that ties them together.

pub mod app_state;
pub mod session;
pub mod store;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerEvent};
pub use session::{FocusSession, NewFocusSession, StudyStats, UserStudyAggregate, UserUpdate};
pub use store::TimerStore;
pub use timer_state::{TickOutcome, TimerDurations, TimerMode, TimerState};
