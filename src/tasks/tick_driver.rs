//! One-second tick driver for the timer

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use super::CompletionHandler;
use crate::{
    error::{Result, TimerError},
    state::{AppState, TickOutcome},
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns the single background task that advances the timer.
///
/// The composition root creates one driver and starts it once; a second
/// `start` without a `stop` in between is refused.
#[derive(Debug, Default)]
pub struct TickDriver {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the tick loop. The first tick fires one period after start.
    pub fn start(&mut self, state: Arc<AppState>, handler: Arc<CompletionHandler>) -> Result<()> {
        if self.is_running() {
            return Err(TimerError::DriverAlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.handle = Some(tokio::spawn(tick_loop(state, handler, shutdown_rx)));
        self.shutdown_tx = Some(shutdown_tx);
        Ok(())
    }

    /// Stop ticking and wait for the loop to exit.
    ///
    /// Completion handlers already spawned keep running to the end.
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Tick driver task ended abnormally: {}", e);
            }
        }
    }
}

async fn tick_loop(
    state: Arc<AppState>,
    handler: Arc<CompletionHandler>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    info!("Starting tick driver");

    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                info!("Tick driver stopped");
                break;
            }

            _ = interval.tick() => {
                match state.tick() {
                    Ok(TickOutcome::Completed(mode)) => {
                        debug!("Handing {} completion to the completion handler", mode);
                        // Remote writes must not hold up the next tick
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            handler.handle(mode).await;
                        });
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to advance timer: {}", e),
                }
            }
        }
    }
}
