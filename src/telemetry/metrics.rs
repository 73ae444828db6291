//! Prometheus metrics

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Relay counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Raw ticks parsed from a feed
    TicksReceived,
    /// Ticks accepted by the change detector
    TicksAccepted,
    /// Ticks suppressed by the change detector
    TicksSuppressed,
    /// Ticks dropped because they could not be normalized or encoded
    TicksRejected,
    /// Messages delivered to the consensus application
    Deliveries,
    /// Local deliveries that failed
    DeliveryFailures,
    /// Transactions accepted by the broadcast endpoint
    Broadcasts,
    /// Broadcast submissions that failed
    BroadcastFailures,
    /// Deposit events relayed
    Deposits,
}

impl CounterMetric {
    pub fn name(&self) -> &'static str {
        match self {
            CounterMetric::TicksReceived => "relay_ticks_received_total",
            CounterMetric::TicksAccepted => "relay_ticks_accepted_total",
            CounterMetric::TicksSuppressed => "relay_ticks_suppressed_total",
            CounterMetric::TicksRejected => "relay_ticks_rejected_total",
            CounterMetric::Deliveries => "relay_deliveries_total",
            CounterMetric::DeliveryFailures => "relay_delivery_failures_total",
            CounterMetric::Broadcasts => "relay_broadcasts_total",
            CounterMetric::BroadcastFailures => "relay_broadcast_failures_total",
            CounterMetric::Deposits => "relay_deposits_total",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Increment a counter by one with a single label
pub fn increment_labeled(metric: CounterMetric, key: &'static str, value: String) {
    metrics::counter!(metric.name(), key => value).increment(1);
}

/// Install the global recorder and serve `/metrics` on `port`
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
