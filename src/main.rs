//! Chain Timers - A multi-timer scheduler service
//!
//! This is the main entry point for the chain-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use chain_timers::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::SnapshotStorage,
    tasks::{alarm_task, catch_up_since, persistence_task, ticker_task},
    utils::{clock::local_now, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("chain_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting chain-timers server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, state_file={}, tick={}ms",
        config.host,
        config.port,
        config.state_file.display(),
        config.tick_ms
    );

    // Load the persisted snapshot
    let storage = SnapshotStorage::new(config.state_file.clone());
    let snapshot = storage.load()?.unwrap_or_default();
    let saved_at = snapshot.saved_at;

    let state = Arc::new(AppState::with_snapshot(snapshot, config.port, config.host.clone()));

    // Start listeners before the catch-up tick so its alarms are not lost
    let alarm_state = Arc::clone(&state);
    let alarm_events = state.subscribe_events();
    tokio::spawn(async move {
        alarm_task(alarm_state, alarm_events).await;
    });

    let snapshots = state.subscribe_snapshots();
    let persist_storage = storage.clone();
    let debounce = config.persist_debounce();
    tokio::spawn(async move {
        persistence_task(snapshots, persist_storage, debounce).await;
    });

    // Account for the time the process was down
    if let Some(saved_at) = saved_at {
        if let Err(e) = catch_up_since(&state, saved_at, &local_now()) {
            warn!("Catch-up tick failed: {}", e);
        }
    }

    let ticker_state = Arc::clone(&state);
    let (tick_every, suspend_gap) = (config.tick_interval(), config.suspend_gap());
    tokio::spawn(async move {
        ticker_task(ticker_state, tick_every, suspend_gap).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers, PATCH|DELETE /timers/:id");
    info!("  POST   /timers/:id/start|pause|reset");
    info!("  POST   /groups, PATCH|DELETE /groups/:id");
    info!("  POST   /groups/:id/start|reset|reorder|toggle-collapse");
    info!("  POST   /tick, /dark-mode/toggle, /lifecycle/background|foreground");
    info!("  GET    /state, /status, /health");

    // Setup graceful shutdown
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

    // Final write so nothing from the debounce window is lost
    match state.snapshot() {
        Ok(snapshot) => {
            if let Err(e) = storage.save(&snapshot, local_now().timestamp_millis()).await {
                tracing::error!("Failed to save snapshot on shutdown: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to read snapshot on shutdown: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}
