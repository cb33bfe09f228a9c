//! Hook metrics

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

const INVOCATIONS: &str = "kit_hook_invocations_total";
const LATENCY_MS: &str = "kit_hook_latency_ms";
const ALERTS: &str = "kit_hook_alerts_total";

/// Record one hook invocation
pub fn record_invocation(hook: &'static str, outcome: &'static str, duration: Duration) {
    let latency_ms = duration.as_secs_f64() * 1000.0;

    counter!(INVOCATIONS, "hook" => hook, "outcome" => outcome).increment(1);
    histogram!(LATENCY_MS, "hook" => hook).record(latency_ms);

    tracing::debug!(hook, outcome, latency_ms, "Hook invocation recorded");
}

/// Record alerts raised by a hook
pub fn record_alerts(hook: &'static str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(ALERTS, "hook" => hook).increment(count as u64);
}

/// Serve Prometheus metrics on the given port
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
