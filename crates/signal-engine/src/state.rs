//! Per-key deduplication state.

use serde::{Deserialize, Serialize};
use signal_core::types::Direction;
use std::fmt;

/// Memory kept for one (instrument, timeframe) between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalState {
    /// Direction of the pending arming episode
    pub armed: Option<Direction>,
    /// A signal was emitted for the current episode
    pub notified: bool,
    /// Direction of the last emitted signal
    pub last_emitted: Option<Direction>,
    /// A breakout was observed since the key was armed
    pub breakout_seen: bool,
}

/// Derived view of [`SignalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed(Direction),
    Notified(Direction),
}

impl SignalState {
    pub fn phase(&self) -> Phase {
        match (self.notified, self.last_emitted, self.armed) {
            (true, Some(d), _) => Phase::Notified(d),
            (_, _, Some(d)) => Phase::Armed(d),
            _ => Phase::Idle,
        }
    }

    /// Start a new arming episode.
    pub(crate) fn arm(&mut self, direction: Direction) {
        self.armed = Some(direction);
        self.notified = false;
        self.breakout_seen = false;
    }

    /// Record an emission for `direction`.
    pub(crate) fn notify(&mut self, direction: Direction) {
        self.armed = Some(direction);
        self.notified = true;
        self.last_emitted = Some(direction);
    }

    /// Back to idle. The last emitted direction is kept.
    pub(crate) fn reset(&mut self) {
        self.armed = None;
        self.notified = false;
        self.breakout_seen = false;
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "IDLE"),
            Phase::Armed(d) => write!(f, "ARMED({})", d),
            Phase::Notified(d) => write!(f, "NOTIFIED({})", d),
        }
    }
}
