use std::net::SocketAddr;

use crate::wire::Request;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total requests served. Labels: cmd, status.
pub const REQUESTS_TOTAL: &str = "courtbook_requests_total";

/// Histogram: request latency in seconds. Labels: cmd.
pub const REQUEST_DURATION_SECONDS: &str = "courtbook_request_duration_seconds";

/// Counter: bookings accepted and appended to the sheet.
pub const SUBMISSIONS_TOTAL: &str = "courtbook_submissions_total";

/// Counter: submissions rejected because the slot was occupied.
pub const CONFLICTS_TOTAL: &str = "courtbook_conflicts_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "courtbook_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "courtbook_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "courtbook_connections_rejected_total";

/// Counter: failed password handshakes.
pub const AUTH_FAILURES_TOTAL: &str = "courtbook_auth_failures_total";

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

/// Map a Request variant to a short label for metrics.
pub fn request_label(request: &Request) -> &'static str {
    match request {
        Request::Auth { .. } => "auth",
        Request::Submit { .. } => "submit",
        Request::Calendar { .. } => "calendar",
        Request::Check { .. } => "check",
        Request::Bookings => "bookings",
    }
}
