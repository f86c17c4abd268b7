//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{error::Result, state::TimerDurations};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "study-timer")]
#[command(about = "A Pomodoro timer service that records focus sessions and study stats")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the study backend REST API
    #[arg(long, env = "STUDY_TIMER_BACKEND_URL", default_value = "http://localhost:5000/api")]
    pub backend_url: String,

    /// Bearer token of the signed-in user
    #[arg(long, env = "STUDY_TIMER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Focus session length in minutes
    #[arg(long, default_value = "25")]
    pub focus_minutes: u64,

    /// Short break length in minutes
    #[arg(long, default_value = "5")]
    pub short_break_minutes: u64,

    /// Long break length in minutes
    #[arg(long, default_value = "15")]
    pub long_break_minutes: u64,

    /// File the timer state is mirrored to
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Do not play a sound when a focus session completes
    #[arg(long)]
    pub no_sound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Validated mode durations
    pub fn durations(&self) -> Result<TimerDurations> {
        TimerDurations::from_minutes(
            self.focus_minutes,
            self.short_break_minutes,
            self.long_break_minutes,
        )
    }
}
