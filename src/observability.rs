use std::net::SocketAddr;

// ── RED metrics (pass-driven) ───────────────────────────────────

/// Counter: matchmaking passes executed. Labels: status.
pub const PASSES_TOTAL: &str = "squadsync_passes_total";

/// Histogram: full pass latency in seconds.
pub const PASS_DURATION_SECONDS: &str = "squadsync_pass_duration_seconds";

// ── USE metrics (engine output volume) ──────────────────────────

/// Counter: sessions persisted by a pass (new + adopted).
pub const SESSIONS_PLANNED_TOTAL: &str = "squadsync_sessions_planned_total";

/// Counter: obsolete/displaced sessions deleted by a pass.
pub const SESSIONS_DELETED_TOTAL: &str = "squadsync_sessions_deleted_total";

/// Counter: user-visible notices dispatched. Labels: kind.
pub const NOTIFICATIONS_SENT_TOTAL: &str = "squadsync_notifications_sent_total";

/// Counter: notices that failed to dispatch (logged, never retried).
pub const NOTIFICATIONS_FAILED_TOTAL: &str = "squadsync_notifications_failed_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
