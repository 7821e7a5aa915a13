//! Turn Timer - A turn-based multiplayer countdown timer for tabletop games
//!
//! This is the main entry point for the turn-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use turn_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{turn_clock_task, undo_expiry_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("turn_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting turn-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, players={}, time={}s, reset_on={:?}",
          config.host, config.port, config.players, config.time, config.reset_on);

    // Create application state with a fresh table
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.engine_settings(),
    ));

    // Start the clock and undo expiry background tasks
    let clock_state = Arc::clone(&state);
    tokio::spawn(async move {
        turn_clock_task(clock_state).await;
    });

    let undo_state = Arc::clone(&state);
    tokio::spawn(async move {
        undo_expiry_task(undo_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /state          - Current table snapshot");
    info!("  GET  /events         - Snapshot stream (SSE)");
    info!("  POST /toggle         - Start or pause");
    info!("  POST /next | /tap    - Next turn");
    info!("  POST /skip           - Skip a player");
    info!("  POST /reverse        - Reverse direction");
    info!("  POST /undo           - Undo last turn change");
    info!("  POST /reset[/confirm|/cancel] - Reset all clocks");
    info!("  POST|DELETE /players - Add or remove a player");
    info!("  PUT  /players/:index/{{name,time,color}} - Edit a player");
    info!("  PUT  /toggles        - Enable reverse/skip");
    info!("  POST /intent         - Any intent as JSON");
    info!("  GET  /health         - Health check");

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

    info!("Server shutdown complete");
    Ok(())
}
