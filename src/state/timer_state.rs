//! Timer state structure and its transition rules

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimerError};

/// Pomodoro timer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    pub fn is_focus(&self) -> bool {
        matches!(self, TimerMode::Focus)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "shortBreak" => Ok(TimerMode::ShortBreak),
            "longBreak" => Ok(TimerMode::LongBreak),
            other => Err(TimerError::UnknownMode(other.to_string())),
        }
    }
}

/// Configured length of each mode, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDurations {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl TimerDurations {
    /// Build durations from minute values, rejecting zero-length and oversized modes
    pub fn from_minutes(focus: u64, short_break: u64, long_break: u64) -> Result<Self> {
        let invalid = |mode: TimerMode, reason: &str| TimerError::InvalidDuration {
            mode: mode.to_string(),
            reason: reason.to_string(),
        };

        let to_secs = |mode: TimerMode, minutes: u64| {
            if minutes == 0 {
                return Err(invalid(mode, "duration must be at least one minute"));
            }
            minutes
                .checked_mul(60)
                .ok_or_else(|| invalid(mode, "duration is too long"))
        };

        // Focus minutes are sent to the backend as a u32
        if u32::try_from(focus).is_err() {
            return Err(invalid(TimerMode::Focus, "duration is too long"));
        }

        Ok(Self {
            focus_secs: to_secs(TimerMode::Focus, focus)?,
            short_break_secs: to_secs(TimerMode::ShortBreak, short_break)?,
            long_break_secs: to_secs(TimerMode::LongBreak, long_break)?,
        })
    }

    pub fn for_mode(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_secs,
            TimerMode::ShortBreak => self.short_break_secs,
            TimerMode::LongBreak => self.long_break_secs,
        }
    }

    /// Length of a focus session in whole minutes, as recorded on the backend
    pub fn focus_minutes(&self) -> u32 {
        u32::try_from(self.focus_secs / 60).unwrap_or(u32::MAX)
    }
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
        }
    }
}

/// Result of applying one tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved down by one second
    Decremented(u64),
    /// The countdown was already at zero while running; the timer is now stopped
    Completed(TimerMode),
    /// Not running, nothing changed
    Idle,
}

/// Timer state for the Pomodoro countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub seconds_remaining: u64,
    pub is_running: bool,
    pub mode: TimerMode,
    pub completed_focus_sessions_today: u32,
    /// Local day the completed-session counter belongs to
    pub counter_date: NaiveDate,
    pub durations: TimerDurations,
}

impl TimerState {
    /// Create a paused timer in focus mode with a full countdown
    pub fn new(durations: TimerDurations, today: NaiveDate) -> Self {
        Self {
            seconds_remaining: durations.focus_secs,
            is_running: false,
            mode: TimerMode::Focus,
            completed_focus_sessions_today: 0,
            counter_date: today,
            durations,
        }
    }

    /// Rebuild a timer from a saved copy under the current configuration.
    ///
    /// The restored timer is always paused. Remaining time is clamped to the
    /// configured duration of the saved mode, and the completed-session counter
    /// is kept only if it was saved today.
    pub fn restore(saved: TimerState, durations: TimerDurations, today: NaiveDate) -> Self {
        let mut state = Self::new(durations, today);
        state.mode = saved.mode;
        state.seconds_remaining = saved.seconds_remaining.min(durations.for_mode(saved.mode));
        if saved.counter_date == today {
            state.completed_focus_sessions_today = saved.completed_focus_sessions_today;
        }
        state
    }

    /// Switch mode and reset the countdown to that mode's duration.
    ///
    /// The running flag is left untouched, so a running countdown keeps going
    /// from the new mode's full duration.
    pub fn select_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.seconds_remaining = self.durations.for_mode(mode);
    }

    /// Flip between running and paused, returning the new running flag
    pub fn toggle_running(&mut self) -> bool {
        self.is_running = !self.is_running;
        self.is_running
    }

    /// Stop the timer and set the countdown to `duration` seconds
    pub fn reset(&mut self, duration: u64) {
        self.is_running = false;
        self.seconds_remaining = duration.min(self.current_duration());
    }

    /// Stop the timer and restore the full duration of the current mode
    pub fn reset_current(&mut self) {
        self.reset(self.current_duration());
    }

    pub fn current_duration(&self) -> u64 {
        self.durations.for_mode(self.mode)
    }

    /// Advance the timer by one second.
    ///
    /// Completion is reported on the tick *after* the countdown reaches zero:
    /// the tick that moves 1 -> 0 only decrements, and the following tick sees
    /// a running timer at zero, stops it, and returns `Completed`. Since the
    /// timer is stopped in the same step, a completion is reported at most once.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Idle;
        }

        if self.seconds_remaining > 0 {
            self.seconds_remaining -= 1;
            TickOutcome::Decremented(self.seconds_remaining)
        } else {
            self.is_running = false;
            TickOutcome::Completed(self.mode)
        }
    }

    /// Number of focus sessions completed on `today`
    pub fn completed_today(&self, today: NaiveDate) -> u32 {
        if self.counter_date == today {
            self.completed_focus_sessions_today
        } else {
            0
        }
    }

    /// Count one completed focus session, starting a fresh count on a new day
    pub fn record_focus_completion(&mut self, today: NaiveDate) -> u32 {
        if self.counter_date != today {
            self.counter_date = today;
            self.completed_focus_sessions_today = 0;
        }
        self.completed_focus_sessions_today += 1;
        self.completed_focus_sessions_today
    }
}
