//! Traffic Light - A state-managed HTTP server running a cycle timer
//! 
//! This is the main entry point for the traffic-light application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use traffic_light::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{display_task, tick_loop_task, IntervalScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("traffic_light={},tower_http=info", config.log_level()))
        .init();

    info!("Starting traffic-light server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, frame={}ms",
          config.host, config.port, config.frame_ms);

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone()));

    // Start the tick loop and display background tasks
    let scheduler = IntervalScheduler::new(config.frame_period());
    let tick_loop = tokio::spawn(tick_loop_task(Arc::clone(&state), scheduler));
    let display = tokio::spawn(display_task(state.subscribe_snapshots()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle - Start or pause the light");
    info!("  POST /reset  - Reset to a paused red light");
    info!("  POST /start  - Start the light");
    info!("  POST /pause  - Pause the light");
    info!("  GET  /status - Current phase and countdown");
    info!("  GET  /health - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    // Stop the light so no frame lands after teardown
    if let Err(e) = state.pause() {
        tracing::warn!("Failed to pause timer on shutdown: {}", e);
    }
    tick_loop.abort();
    display.abort();

    info!("Server shutdown complete");
    Ok(())
}
