//! Study Timer - A Pomodoro timer service for students
//!
//! This is the main entry point and composition root: it owns the single tick
//! driver and wires the backend, notifier, and sound player into it.

use std::sync::Arc;
use anyhow::Context;
use chrono::Local;
use tokio::net::TcpListener;
use tracing::{info, warn};

use study_timer::{
    api::create_router,
    config::Config,
    services::{CommandSoundPlayer, HttpBackend, LogNotifier, SilentPlayer, SoundPlayer, StudyBackend},
    state::{AppState, TimerState, TimerStore},
    tasks::{CompletionHandler, TickDriver},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("study_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting study-timer v{}", env!("CARGO_PKG_VERSION"));

    let durations = config.durations().context("Invalid timer durations")?;
    info!(
        "Configuration: host={}, port={}, backend={}, focus={}min, short={}min, long={}min",
        config.host,
        config.port,
        config.backend_url,
        config.focus_minutes,
        config.short_break_minutes,
        config.long_break_minutes
    );

    // Restore the last saved timer, always paused
    let today = Local::now().date_naive();
    let store = config.state_file.as_deref().map(TimerStore::new).transpose()?;
    let timer = match store.as_ref().map(TimerStore::load).transpose() {
        Ok(Some(Some(saved))) => {
            info!("Restored {} timer with {}s remaining", saved.mode, saved.seconds_remaining);
            TimerState::restore(saved, durations, today)
        }
        Ok(_) => TimerState::new(durations, today),
        Err(e) => {
            warn!("Ignoring unreadable timer state: {:#}", e);
            TimerState::new(durations, today)
        }
    };

    let mut app_state = AppState::new(config.port, config.host.clone(), timer);
    if let Some(store) = store {
        info!("Mirroring timer state to {}", store.path().display());
        app_state = app_state.with_store(store);
    }
    let state = Arc::new(app_state);

    let backend: Arc<dyn StudyBackend> =
        Arc::new(HttpBackend::new(config.backend_url.clone(), config.token.clone())?);

    // Load the signed-in user so completed sessions can be credited
    if config.token.is_some() {
        match backend.current_user().await {
            Ok(user) => {
                info!("Signed in as {} (xp={})", user.name.as_deref().unwrap_or(&user.id), user.xp);
                state.set_user(Some(user));
            }
            Err(e) => warn!("Failed to load signed-in user, sessions will not be recorded: {}", e),
        }
    } else {
        warn!("No token configured, focus sessions will not be recorded");
    }

    let sound: Arc<dyn SoundPlayer> = if config.no_sound {
        Arc::new(SilentPlayer)
    } else {
        Arc::new(CommandSoundPlayer)
    };
    let handler = Arc::new(CompletionHandler::new(
        Arc::clone(&state),
        backend,
        Arc::new(LogNotifier),
        sound,
    ));

    // The one tick driver for this process
    let mut driver = TickDriver::new();
    driver.start(Arc::clone(&state), handler)?;

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer          - Current timer");
    info!("  POST /timer/mode     - Select focus, shortBreak or longBreak");
    info!("  POST /timer/toggle   - Start or pause");
    info!("  POST /timer/reset    - Stop and restore the duration");
    info!("  GET  /sessions       - Focus sessions recorded in this run");
    info!("  GET  /notifications  - Recent notifications");
    info!("  GET  /user           - Signed-in user's study totals");
    info!("  GET  /status         - Timer and server status");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for signals: {}", e),
            }
        }
    }

    driver.stop().await;
    state.save_timer();

    info!("Server shutdown complete");
    Ok(())
}
