//! Background tasks module
//!
//! This module contains the tick driver that advances the timer and the
//! completion handler it hands finished countdowns to.

pub mod completion;
pub mod tick_driver;

// Re-export main types
pub use completion::CompletionHandler;
pub use tick_driver::TickDriver;
