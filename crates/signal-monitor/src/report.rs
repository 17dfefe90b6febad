//! Per-tick scan summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Counters for one pass over every tracked key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    pub started_at: DateTime<Utc>,
    /// Keys evaluated this tick
    pub keys: usize,
    /// Keys that emitted a signal
    pub emitted: usize,
    /// Keys evaluated without a signal
    pub quiet: usize,
    /// Keys whose window was too short or malformed
    pub skipped: usize,
    /// Keys whose candles could not be fetched
    pub source_failures: usize,
    /// Successful deliveries over all destinations
    pub delivered: usize,
    /// Failed deliveries over all destinations
    pub delivery_failures: usize,
    pub elapsed_ms: u64,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            started_at: Utc::now(),
            keys: 0,
            emitted: 0,
            quiet: 0,
            skipped: 0,
            source_failures: 0,
            delivered: 0,
            delivery_failures: 0,
            elapsed_ms: 0,
        }
    }

    /// Record a key that emitted a signal and how its deliveries went.
    pub fn record_emitted(&mut self, delivered: usize, failed: usize) {
        self.keys += 1;
        self.emitted += 1;
        self.delivered += delivered;
        self.delivery_failures += failed;
    }

    pub fn record_quiet(&mut self) {
        self.keys += 1;
        self.quiet += 1;
    }

    pub fn record_skipped(&mut self) {
        self.keys += 1;
        self.skipped += 1;
    }

    pub fn record_source_failure(&mut self) {
        self.keys += 1;
        self.source_failures += 1;
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    /// No source or delivery failed.
    pub fn is_clean(&self) -> bool {
        self.source_failures == 0 && self.delivery_failures == 0
    }

    /// Log the summary, at `warn` when anything failed.
    pub fn log(&self) {
        if self.is_clean() {
            info!(
                tick = self.tick,
                keys = self.keys,
                emitted = self.emitted,
                skipped = self.skipped,
                elapsed_ms = self.elapsed_ms,
                "Tick complete"
            );
        } else {
            warn!(
                tick = self.tick,
                keys = self.keys,
                emitted = self.emitted,
                source_failures = self.source_failures,
                delivery_failures = self.delivery_failures,
                elapsed_ms = self.elapsed_ms,
                "Tick complete with failures"
            );
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} keys, {} emitted, {} quiet, {} skipped, {} source failures, {}/{} deliveries ok ({} ms)",
            self.tick,
            self.keys,
            self.emitted,
            self.quiet,
            self.skipped,
            self.source_failures,
            self.delivered,
            self.delivered + self.delivery_failures,
            self.elapsed_ms
        )
    }
}
