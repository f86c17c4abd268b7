//! Side effects run when a countdown completes

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    services::{Notification, Notifier, SoundPlayer, StudyBackend},
    state::{AppState, FocusSession, NewFocusSession, TimerEvent, TimerMode},
};

pub const FOCUS_COMPLETE_MESSAGE: &str = "Session complete! +10 XP earned";
pub const BREAK_FINISHED_MESSAGE: &str = "Break finished! Ready to focus?";

/// Runs the mode-dependent side effects of a completed countdown.
///
/// Every remote failure is logged and dropped here; nothing reaches the tick loop.
pub struct CompletionHandler {
    state: Arc<AppState>,
    backend: Arc<dyn StudyBackend>,
    notifier: Arc<dyn Notifier>,
    sound: Arc<dyn SoundPlayer>,
    /// Held across read, update and store of the user, so overlapping
    /// completions each build on the previous credit
    credit_lock: Mutex<()>,
}

impl CompletionHandler {
    pub fn new(
        state: Arc<AppState>,
        backend: Arc<dyn StudyBackend>,
        notifier: Arc<dyn Notifier>,
        sound: Arc<dyn SoundPlayer>,
    ) -> Self {
        Self {
            state,
            backend,
            notifier,
            sound,
            credit_lock: Mutex::new(()),
        }
    }

    /// Handle the completion of a `mode` countdown. The timer is already stopped.
    pub async fn handle(&self, mode: TimerMode) {
        let session = if mode.is_focus() {
            let session = self.complete_focus().await;

            let sound = Arc::clone(&self.sound);
            tokio::spawn(async move {
                sound.play().await;
            });

            session
        } else {
            self.notify(Notification::toast(BREAK_FINISHED_MESSAGE));
            None
        };

        self.state.publish_event(TimerEvent::Completed { mode, session });
    }

    async fn complete_focus(&self) -> Option<FocusSession> {
        if self.state.current_user().is_none() {
            warn!("Focus session completed without a signed-in user, not recording it");
            return None;
        }

        let minutes = match self.state.get_timer_state() {
            Ok(timer) => timer.durations.focus_minutes(),
            Err(e) => {
                error!("Failed to read timer durations: {}", e);
                return None;
            }
        };

        let session = match self.backend.create_session(NewFocusSession::completed(minutes)).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to record focus session: {}", e);
                return None;
            }
        };

        match self.state.record_focus_session(session.clone()) {
            Ok(count) => info!("Focus session {} recorded ({} today)", session.id, count),
            Err(e) => error!("Failed to count focus session: {}", e),
        }

        self.credit_user(&session, minutes).await;
        Some(session)
    }

    /// Add one focus session's XP and hours to the latest known user totals
    async fn credit_user(&self, session: &FocusSession, minutes: u32) {
        let _credit = self.credit_lock.lock().await;

        let Some(user) = self.state.current_user() else {
            warn!("User signed out before session {} was credited", session.id);
            return;
        };

        match self.backend.update_user(user.focus_reward(minutes)).await {
            Ok(updated) => {
                info!(
                    "User stats updated: xp={}, totalHours={:.2}",
                    updated.xp, updated.study_stats.total_hours
                );
                self.state.set_user(Some(updated));
                self.notify(Notification::toast(FOCUS_COMPLETE_MESSAGE));
            }
            Err(e) => error!("Failed to update user stats: {}", e),
        }
    }

    fn notify(&self, notification: Notification) {
        self.state.push_notification(notification.clone());
        self.notifier.notify(notification);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use chrono::{Local, Utc};

    use crate::{
        error::BackendError,
        state::{StudyStats, TimerDurations, TimerState, UserStudyAggregate, UserUpdate},
    };

    /// In-memory backend that records every call
    #[derive(Default)]
    pub struct FakeBackend {
        pub fail: AtomicBool,
        pub created: Mutex<Vec<NewFocusSession>>,
        pub updates: Mutex<Vec<UserUpdate>>,
        /// How long `create_session` takes to answer
        pub create_delay: Option<Duration>,
    }

    impl FakeBackend {
        pub fn slow(create_delay: Duration) -> Self {
            Self {
                create_delay: Some(create_delay),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            let backend = Self::default();
            backend.fail.store(true, Ordering::SeqCst);
            backend
        }

        fn check(&self) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(BackendError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl StudyBackend for FakeBackend {
        async fn create_session(&self, session: NewFocusSession) -> Result<FocusSession, BackendError> {
            if let Some(delay) = self.create_delay {
                tokio::time::sleep(delay).await;
            }
            self.check()?;
            let mut created = self.created.lock().unwrap();
            created.push(session.clone());
            Ok(FocusSession {
                id: format!("s{}", created.len()),
                duration_minutes: session.duration_minutes,
                completed: session.completed,
                created_at: Utc::now(),
            })
        }

        async fn update_user(&self, update: UserUpdate) -> Result<UserStudyAggregate, BackendError> {
            self.check()?;
            self.updates.lock().unwrap().push(update.clone());
            Ok(UserStudyAggregate {
                id: "u1".to_string(),
                name: Some("Ada".to_string()),
                xp: update.xp,
                study_stats: update.study_stats,
            })
        }

        async fn current_user(&self) -> Result<UserStudyAggregate, BackendError> {
            self.check()?;
            Ok(test_user())
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.messages.lock().unwrap().push(notification.message);
        }
    }

    #[derive(Default)]
    pub struct CountingPlayer {
        pub plays: AtomicUsize,
    }

    #[async_trait]
    impl SoundPlayer for CountingPlayer {
        async fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn test_user() -> UserStudyAggregate {
        UserStudyAggregate {
            id: "u1".to_string(),
            name: Some("Ada".to_string()),
            xp: 100,
            study_stats: StudyStats { total_hours: 1.0 },
        }
    }

    pub fn test_state() -> Arc<AppState> {
        let timer = TimerState::new(TimerDurations::default(), Local::now().date_naive());
        let state = AppState::new(0, "127.0.0.1".to_string(), timer);
        state.set_user(Some(test_user()));
        Arc::new(state)
    }

    struct Harness {
        state: Arc<AppState>,
        backend: Arc<FakeBackend>,
        notifier: Arc<RecordingNotifier>,
        player: Arc<CountingPlayer>,
        handler: CompletionHandler,
    }

    /// Let detached sound tasks run
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn harness(backend: FakeBackend) -> Harness {
        let state = test_state();
        let backend = Arc::new(backend);
        let notifier = Arc::new(RecordingNotifier::default());
        let player = Arc::new(CountingPlayer::default());
        let handler = CompletionHandler::new(
            Arc::clone(&state),
            backend.clone(),
            notifier.clone(),
            player.clone(),
        );
        Harness {
            state,
            backend,
            notifier,
            player,
            handler,
        }
    }

    #[tokio::test]
    async fn test_focus_completion_records_session_and_rewards_user() {
        let h = harness(FakeBackend::default());
        let mut events = h.state.events();

        h.handler.handle(TimerMode::Focus).await;

        assert_eq!(*h.backend.created.lock().unwrap(), vec![NewFocusSession::completed(25)]);
        assert_eq!(h.state.get_timer_state().unwrap().completed_focus_sessions_today, 1);
        assert_eq!(h.state.get_sessions().unwrap().len(), 1);

        let user = h.state.current_user().unwrap();
        assert_eq!(user.xp, 110);
        assert!((user.study_stats.total_hours - (1.0 + 25.0 / 60.0)).abs() < 1e-9);
        assert_eq!(*h.notifier.messages.lock().unwrap(), vec![FOCUS_COMPLETE_MESSAGE]);

        settle().await;
        assert_eq!(h.player.plays.load(Ordering::SeqCst), 1);

        match events.recv().await.unwrap() {
            TimerEvent::Completed { mode, session } => {
                assert_eq!(mode, TimerMode::Focus);
                assert_eq!(session.unwrap().duration_minutes, 25);
            }
        }
    }

    #[tokio::test]
    async fn test_focus_completion_survives_backend_failure() {
        let h = harness(FakeBackend::failing());
        let mut events = h.state.events();

        h.handler.handle(TimerMode::Focus).await;

        assert_eq!(h.state.get_timer_state().unwrap().completed_focus_sessions_today, 0);
        assert!(h.state.get_sessions().unwrap().is_empty());
        assert_eq!(h.state.current_user().unwrap().xp, 100);
        assert!(h.notifier.messages.lock().unwrap().is_empty());
        assert_eq!(
            events.recv().await.unwrap(),
            TimerEvent::Completed {
                mode: TimerMode::Focus,
                session: None
            }
        );
    }

    #[tokio::test]
    async fn test_break_completion_makes_no_remote_calls() {
        for mode in [TimerMode::ShortBreak, TimerMode::LongBreak] {
            let h = harness(FakeBackend::default());
            h.handler.handle(mode).await;

            assert!(h.backend.created.lock().unwrap().is_empty());
            assert!(h.backend.updates.lock().unwrap().is_empty());
            assert_eq!(*h.notifier.messages.lock().unwrap(), vec![BREAK_FINISHED_MESSAGE]);
            assert_eq!(h.state.recent_notifications()[0].message, BREAK_FINISHED_MESSAGE);

            settle().await;
            assert_eq!(h.player.plays.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_focus_completions_are_each_credited() {
        let h = harness(FakeBackend::slow(Duration::from_millis(200)));

        tokio::join!(h.handler.handle(TimerMode::Focus), h.handler.handle(TimerMode::Focus));

        assert_eq!(h.state.get_timer_state().unwrap().completed_focus_sessions_today, 2);
        let xp_sent: Vec<_> = h.backend.updates.lock().unwrap().iter().map(|u| u.xp).collect();
        assert_eq!(xp_sent, vec![110, 120]);

        let user = h.state.current_user().unwrap();
        assert_eq!(user.xp, 120);
        assert!((user.study_stats.total_hours - (1.0 + 50.0 / 60.0)).abs() < 1e-9);

        settle().await;
        assert_eq!(h.player.plays.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_focus_completion_without_user_skips_remote_writes() {
        let h = harness(FakeBackend::default());
        h.state.set_user(None);

        h.handler.handle(TimerMode::Focus).await;

        assert!(h.backend.created.lock().unwrap().is_empty());
        assert_eq!(h.state.get_timer_state().unwrap().completed_focus_sessions_today, 0);
    }
}
