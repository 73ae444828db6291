//! Price relay pipeline

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::broadcast::BroadcastGate;
use crate::dedup::{ChangeDetector, Decision};
use crate::delivery::MessageSink;
use crate::error::Result;
use crate::feed::{normalize, PriceObservation};
use crate::message::MessageBuilder;
use crate::telemetry::{self, CounterMetric};

/// Result of one delivery task
#[derive(Debug)]
pub struct DeliveryOutcome {
    /// The transport accepted the message
    pub delivered: bool,
    /// Deferred broadcast, if this instance is the broadcaster
    pub broadcast: Option<JoinHandle<()>>,
}

/// Feed → dedup → message → delivery → broadcast
pub struct PriceRelay {
    detector: ChangeDetector,
    builder: MessageBuilder,
    sink: Arc<dyn MessageSink>,
    gate: Arc<BroadcastGate>,
}

impl PriceRelay {
    pub fn new(builder: MessageBuilder, sink: Arc<dyn MessageSink>, gate: Arc<BroadcastGate>) -> Self {
        Self {
            detector: ChangeDetector::new(),
            builder,
            sink,
            gate,
        }
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Process one observation.
    ///
    /// Dedup state is updated before this returns. Accepted ticks get a
    /// delivery task; `None` means the tick was suppressed.
    pub fn handle_observation(
        &mut self,
        observation: &PriceObservation,
    ) -> Result<Option<JoinHandle<DeliveryOutcome>>> {
        let packed = normalize(observation)?.pack()?;

        if let Decision::Suppressed(reason) = self.detector.observe(&packed) {
            telemetry::increment(CounterMetric::TicksSuppressed);
            tracing::trace!(
                symbol = %packed.symbol,
                price = packed.price_value,
                timestamp = packed.timestamp_secs,
                reason = reason.as_str(),
                "Tick suppressed"
            );
            return Ok(None);
        }
        telemetry::increment(CounterMetric::TicksAccepted);

        let update = self.builder.price_update(&packed);
        let payload = update.encode()?;
        tracing::debug!(
            symbol = %packed.symbol,
            price = packed.price_value,
            timestamp = packed.timestamp_secs,
            "Tick accepted"
        );

        let sink = self.sink.clone();
        let gate = self.gate.clone();

        Ok(Some(tokio::spawn(async move {
            if let Err(e) = sink.deliver(payload).await {
                telemetry::increment(CounterMetric::DeliveryFailures);
                tracing::warn!(error = %e, "Local delivery failed, dropping update");
                return DeliveryOutcome {
                    delivered: false,
                    broadcast: None,
                };
            }
            telemetry::increment(CounterMetric::Deliveries);

            DeliveryOutcome {
                delivered: true,
                broadcast: gate.schedule(update),
            }
        })))
    }

    /// Consume observations until the feed closes
    pub async fn run(mut self, mut observations: mpsc::Receiver<PriceObservation>) {
        while let Some(observation) = observations.recv().await {
            if let Err(e) = self.handle_observation(&observation) {
                telemetry::increment(CounterMetric::TicksRejected);
                tracing::warn!(symbol = %observation.symbol, error = %e, "Dropping tick");
            }
        }
        tracing::info!("Observation stream closed");
    }
}
