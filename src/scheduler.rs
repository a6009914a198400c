use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::engine::Engine;
use crate::model::Ms;

/// Wall-clock read for the background driver. Everything below the driver
/// takes `now` as an explicit parameter; this is the only ambient-clock site.
pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Background task that periodically re-plans and sweeps notifications.
/// Errors are logged and retried on the next tick; a pass either applies in
/// full or not at all.
pub async fn run_scheduler(engine: Arc<Engine>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        let now = now_ms();
        if let Err(e) = engine.run_matchmaking(now).await {
            warn!("scheduled matchmaking pass failed: {e}");
            continue;
        }
        if let Err(e) = engine.sweep_notifications(now).await {
            warn!("notification sweep failed: {e}");
        }
    }
}
