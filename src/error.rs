//! Error types for the timer core and its backend collaborator

use thiserror::Error;

/// Errors raised by the timer state machine and the tick driver
#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Unknown timer mode: {0}")]
    UnknownMode(String),

    #[error("Invalid duration for {mode}: {reason}")]
    InvalidDuration { mode: String, reason: String },

    #[error("Tick driver is already running")]
    DriverAlreadyRunning,

    #[error("Failed to lock {0}")]
    Lock(String),
}

/// Errors returned by the study backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No authenticated user")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, TimerError>;
