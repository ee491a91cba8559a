//! Core rate limiter implementation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::config::RateLimitingConfig;
use crate::error::{Result, TurnstileError};

use super::backend::AdmissionControl;
use super::clock::{Clock, SystemClock};
use super::counter::{ClientCounter, CounterSnapshot, Decision};
use super::events::{AdmissionEvent, EventSink, TracingSink};

/// Per-client fixed-window rate limiter.
///
/// All counters live behind a single lock, and every decision performs its
/// lookup, comparison and mutation as one atomic step. The client map is
/// never handed out; callers only see decisions and snapshots.
///
/// Counters are never evicted. A client that stops sending requests keeps
/// its entry until it returns, at which point the entry is reset in place.
pub struct RateLimiter {
    /// Counters indexed by client identifier
    clients: Mutex<HashMap<String, ClientCounter>>,
    /// Maximum admissions per window
    limit: u32,
    /// Length of the window
    window: Duration,
    /// Where `decide` reads the current instant from
    clock: Arc<dyn Clock>,
    /// Receives one event per decision
    sink: Arc<dyn EventSink>,
}

impl RateLimiter {
    /// Create a limiter admitting at most `limit` requests per `window`.
    ///
    /// Both parameters must be positive.
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        if limit == 0 {
            return Err(TurnstileError::Config(
                "rate limit must be greater than zero".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(TurnstileError::Config(
                "rate limit window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            clients: Mutex::new(HashMap::new()),
            limit,
            window,
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
        })
    }

    /// Create a limiter from the rate limiting section of the configuration.
    pub fn from_config(config: &RateLimitingConfig) -> Result<Self> {
        Self::new(config.limit, config.window())
    }

    /// Replace the decision clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Decide whether `client_id` may proceed now.
    pub fn decide(&self, client_id: &str) -> bool {
        let now = self.clock.now();
        self.decide_at(client_id, now).is_allowed()
    }

    /// Decide for a request from `client_id` arriving at `now`.
    pub fn decide_at(&self, client_id: &str, now: Instant) -> Decision {
        let decision = {
            let mut clients = self.clients.lock();
            match clients.get_mut(client_id) {
                Some(counter) => counter.observe(now, self.limit, self.window),
                None => {
                    clients.insert(client_id.to_string(), ClientCounter::new(now));
                    Decision::FirstSeen
                }
            }
        };

        trace!(client = %client_id, decision = ?decision, "Admission decided");

        self.sink.record(&AdmissionEvent {
            client: client_id,
            decision,
            limit: self.limit,
        });

        decision
    }

    /// Get the maximum admissions per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Get the window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Get a copy of the counter for `client_id`.
    ///
    /// Returns `None` if the client has never been seen.
    pub fn counter_for(&self, client_id: &str) -> Option<CounterSnapshot> {
        self.clients.lock().get(client_id).map(ClientCounter::snapshot)
    }

    /// Get the number of tracked clients.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}

impl AdmissionControl for RateLimiter {
    fn decide(&self, client_id: &str) -> bool {
        RateLimiter::decide(self, client_id)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("clients", &self.client_count())
            .finish()
    }
}
