//! HIIT Timer - An interval-workout timer service
//!
//! This is the main entry point for the hiit-timer application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use hiit_timer::{
    api::create_router,
    config::Config,
    services::{ChannelNotifier, Speech, WakeLock},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("hiit_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting hiit-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, history={}",
        config.host,
        config.port,
        config.history_file.display()
    );

    // Speech is optional; without it announcements are only logged and exposed via /workout/status
    let speech = match config.speech_command.as_deref() {
        Some(command) => match Speech::from_command_line(command) {
            Ok(speech) => {
                info!("Speaking announcements with {}", speech.program());
                Some(speech)
            }
            Err(e) => {
                warn!("{}, announcements will not be spoken", e);
                None
            }
        },
        None => None,
    };

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.history_file.clone(),
        Arc::new(ChannelNotifier::new(speech)),
        WakeLock::new(config.inhibit_sleep),
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /workout/start   - Start a workout (JSON config body)");
    info!("  POST /workout/cancel  - Cancel the active workout");
    info!("  POST /workout/pause   - Pause the countdown");
    info!("  POST /workout/resume  - Resume the countdown");
    info!("  POST /workout/toggle  - Toggle pause");
    info!("  GET  /workout/status  - Current phase, display and announcement");
    info!("  GET  /history         - Finished workouts, newest first");
    info!("  GET  /health          - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.session.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
