//! Observability hook for admission decisions.
//!
//! Events are emitted after the limiter's lock has been released, so a
//! sink never runs inside the critical section.

use tracing::{debug, info};

use super::counter::Decision;

/// A single admission decision, as reported to an [`EventSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionEvent<'a> {
    /// The client identifier the decision was made for
    pub client: &'a str,
    /// What the limiter decided
    pub decision: Decision,
    /// The configured limit at the time of the decision
    pub limit: u32,
}

/// Receives one event per admission decision.
pub trait EventSink: Send + Sync {
    /// Record a decision.
    fn record(&self, event: &AdmissionEvent<'_>);
}

/// Default sink that turns events into `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &AdmissionEvent<'_>) {
        match event.decision {
            Decision::FirstSeen => {
                debug!(client = %event.client, "First request from client");
            }
            Decision::Reset => {
                debug!(client = %event.client, "Rate limit reset for client");
            }
            Decision::Admitted { count } => {
                debug!(
                    client = %event.client,
                    count = count,
                    limit = event.limit,
                    "Client made request {} of {}",
                    count,
                    event.limit
                );
            }
            Decision::Exceeded => {
                info!(
                    client = %event.client,
                    limit = event.limit,
                    "Rate limit exceeded for client"
                );
            }
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &AdmissionEvent<'_>) {}
}
