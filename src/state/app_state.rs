//! Main application state management

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{FocusSession, TickOutcome, TimerMode, TimerState, TimerStore, UserStudyAggregate};
use crate::{
    error::{Result, TimerError},
    services::Notification,
};

/// Number of notifications kept for clients that poll them
const RECENT_NOTIFICATIONS: usize = 20;

/// Events emitted once a completion has been fully handled
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    Completed {
        mode: TimerMode,
        /// Session recorded on the backend, if any
        session: Option<FocusSession>,
    },
}

/// Shared state owned by the composition root and handed to the tick driver,
/// the completion handler, and the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// Countdown, mode, and today's completed-session count
    pub timer_state: Arc<Mutex<TimerState>>,
    /// Focus sessions recorded during this run
    pub sessions: Arc<Mutex<Vec<FocusSession>>>,
    /// Authenticated user context, loaded at startup
    pub user: Arc<Mutex<Option<UserStudyAggregate>>>,
    pub notifications: Arc<Mutex<VecDeque<Notification>>>,
    /// Optional durable mirror of the timer
    pub store: Option<TimerStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
    /// Channel for completion events
    pub event_tx: broadcast::Sender<TimerEvent>,
}

impl AppState {
    /// Create a new AppState around an initial timer
    pub fn new(port: u16, host: String, timer: TimerState) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(timer.clone());
        let (event_tx, _) = broadcast::channel(16);

        Self {
            timer_state: Arc::new(Mutex::new(timer)),
            sessions: Arc::new(Mutex::new(Vec::new())),
            user: Arc::new(Mutex::new(None)),
            notifications: Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_NOTIFICATIONS))),
            store: None,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            event_tx,
        }
    }

    /// Mirror timer changes to `store`
    pub fn with_store(mut self, store: TimerStore) -> Self {
        self.store = Some(store);
        self
    }

    fn lock_timer(&self) -> Result<std::sync::MutexGuard<'_, TimerState>> {
        self.timer_state
            .lock()
            .map_err(|e| TimerError::Lock(format!("timer state: {}", e)))
    }

    /// Apply `updater` to the timer in one critical section.
    ///
    /// The new state is published, and saved when `persist_if` accepts the
    /// result, before the lock is released, so watchers and the store never
    /// see updates out of order.
    fn apply_timer<F, P, R>(&self, updater: F, persist_if: P) -> Result<(R, TimerState)>
    where
        F: FnOnce(&mut TimerState) -> R,
        P: FnOnce(&R) -> bool,
    {
        let mut timer = self.lock_timer()?;
        let result = updater(&mut timer);
        let new_timer = timer.clone();

        // Notify timer state watchers
        if let Err(e) = self.timer_update_tx.send(new_timer.clone()) {
            warn!("Failed to send timer update: {}", e);
        }
        if persist_if(&result) {
            self.persist(&new_timer);
        }
        drop(timer);

        Ok((result, new_timer))
    }

    /// Apply a user action to the timer, then record and persist it
    fn update_timer<F>(&self, action: &str, updater: F) -> Result<TimerState>
    where
        F: FnOnce(&mut TimerState),
    {
        let ((), new_timer) = self.apply_timer(updater, |_| true)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(new_timer)
    }

    /// Switch to `mode` with a full countdown; the running flag is unchanged
    pub fn select_mode(&self, mode: TimerMode) -> Result<TimerState> {
        info!("Selecting timer mode: {}", mode);
        self.update_timer(mode.as_str(), |timer| timer.select_mode(mode))
    }

    pub fn toggle_running(&self) -> Result<TimerState> {
        let timer = self.update_timer("toggle", |timer| {
            timer.toggle_running();
        })?;
        info!(
            "Timer {} at {}s ({})",
            if timer.is_running { "started" } else { "paused" },
            timer.seconds_remaining,
            timer.mode
        );
        Ok(timer)
    }

    /// Stop the timer at `seconds`, or at the current mode's full duration
    pub fn reset(&self, seconds: Option<u64>) -> Result<TimerState> {
        info!("Resetting timer");
        self.update_timer("reset", |timer| match seconds {
            Some(seconds) => timer.reset(seconds),
            None => timer.reset_current(),
        })
    }

    /// Advance the timer by one second
    pub fn tick(&self) -> Result<TickOutcome> {
        let (outcome, _) = self.apply_timer(TimerState::tick, |outcome| {
            matches!(outcome, TickOutcome::Completed(_))
        })?;
        match outcome {
            TickOutcome::Completed(mode) => info!("{} countdown completed", mode),
            TickOutcome::Decremented(remaining) => debug!("Tick: {}s remaining", remaining),
            TickOutcome::Idle => {}
        }
        Ok(outcome)
    }

    /// Get current timer state, with a counter left over from an earlier day reported as zero
    pub fn get_timer_state(&self) -> Result<TimerState> {
        let today = Local::now().date_naive();
        self.lock_timer().map(|timer| {
            let mut timer = timer.clone();
            if timer.counter_date != today {
                timer.counter_date = today;
                timer.completed_focus_sessions_today = 0;
            }
            timer
        })
    }

    /// Watch every timer change, starting from the current value
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Receive completion events published after this call
    pub fn events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn publish_event(&self, event: TimerEvent) {
        // No subscribers is the normal case outside of tests
        let _ = self.event_tx.send(event);
    }

    /// Count a completed focus session and keep its record, returning today's count
    pub fn record_focus_session(&self, session: FocusSession) -> Result<u32> {
        let today = Local::now().date_naive();
        let (count, _) = self.apply_timer(|timer| timer.record_focus_completion(today), |_| true)?;

        self.sessions
            .lock()
            .map_err(|e| TimerError::Lock(format!("sessions: {}", e)))?
            .push(session);

        Ok(count)
    }

    pub fn get_sessions(&self) -> Result<Vec<FocusSession>> {
        self.sessions
            .lock()
            .map(|sessions| sessions.clone())
            .map_err(|e| TimerError::Lock(format!("sessions: {}", e)))
    }

    pub fn current_user(&self) -> Option<UserStudyAggregate> {
        self.user.lock().ok().and_then(|user| user.clone())
    }

    pub fn set_user(&self, user: Option<UserStudyAggregate>) {
        if let Ok(mut current) = self.user.lock() {
            *current = user;
        }
    }

    /// Keep `notification` in the bounded recent list
    pub fn push_notification(&self, notification: Notification) {
        if let Ok(mut recent) = self.notifications.lock() {
            if recent.len() == RECENT_NOTIFICATIONS {
                recent.pop_front();
            }
            recent.push_back(notification);
        }
    }

    pub fn recent_notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Save the current timer to the store, if one is configured
    pub fn save_timer(&self) {
        match self.lock_timer() {
            Ok(timer) => self.persist(&timer),
            Err(e) => warn!("Failed to read timer for saving: {}", e),
        }
    }

    fn persist(&self, timer: &TimerState) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(timer) {
                warn!("Failed to save timer state: {:#}", e);
            }
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
