//! Emitted trading signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::{Direction, Timeframe};

/// Identifies one tracked (instrument, timeframe) series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub instrument: String,
    pub timeframe: Timeframe,
}

impl SeriesKey {
    pub fn new(instrument: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            instrument: instrument.into(),
            timeframe,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.instrument, self.timeframe)
    }
}

/// Side of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSide {
    Long,
    Short,
}

impl From<Direction> for SignalSide {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bullish => SignalSide::Long,
            Direction::Bearish => SignalSide::Short,
        }
    }
}

impl fmt::Display for SignalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSide::Long => write!(f, "LONG"),
            SignalSide::Short => write!(f, "SHORT"),
        }
    }
}

/// A decided signal, produced at most once per arming episode per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal ID
    pub id: Uuid,
    pub instrument: String,
    pub timeframe: Timeframe,
    pub side: SignalSide,
    /// Close of the candle that produced the decision
    pub reference_price: f64,
    /// Time of that candle (Unix milliseconds)
    pub candle_time: i64,
    /// Indicator values at decision time, keyed by name
    pub supporting_indicators: BTreeMap<String, f64>,
    pub target_price: f64,
    pub stop_price: f64,
    /// Name of the policy that decided
    pub policy: String,
    /// Human-readable reason
    pub reason: String,
}

impl Signal {
    /// Series key this signal belongs to.
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.instrument.clone(), self.timeframe)
    }

    /// Look up a supporting indicator value.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.supporting_indicators.get(name).copied()
    }
}
