use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use squadsync::config::MatchConfig;
use squadsync::engine::Engine;
use squadsync::notify::{LogDispatcher, SessionHub};
use squadsync::scheduler;
use squadsync::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("SQUADSYNC_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    squadsync::observability::init(metrics_port);

    let tick_secs: u64 = std::env::var("SQUADSYNC_TICK_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(
        store.clone(),
        store,
        Arc::new(SessionHub::new()),
        Arc::new(LogDispatcher),
        MatchConfig::default(),
    ));

    info!("squadsync starting");
    info!("  tick: {tick_secs}s");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!(
            "http://0.0.0.0:{p}/metrics"
        ))
    );

    let driver = tokio::spawn(scheduler::run_scheduler(
        engine,
        Duration::from_secs(tick_secs),
    ));

    // Stop on SIGTERM/ctrl-c; the driver finishes its current tick and dies
    // with the process. Passes are atomic, so nothing is left half-applied.
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    info!("shutdown signal received");
    driver.abort();
    info!("squadsync stopped");
    Ok(())
}
