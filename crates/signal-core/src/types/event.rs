//! Detection types: directions, range boxes and raw events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossover or breakout.
///
/// Bullish doubles as "up" for breakouts, bearish as "down".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
        }
    }
}

/// Trailing high/low envelope used as a breakout reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBox {
    pub high: f64,
    pub low: f64,
    /// `high - low`
    pub size: f64,
}

impl RangeBox {
    /// Build a box from its bounds.
    pub fn new(high: f64, low: f64) -> Self {
        Self {
            high,
            low,
            size: high - low,
        }
    }

    /// A box may only drive a decision when its bounds are finite and it has
    /// a strictly positive size.
    pub fn is_valid(&self) -> bool {
        self.high.is_finite() && self.low.is_finite() && self.size.is_finite() && self.size > 0.0
    }

    /// Inclusive containment: touching a bound counts as inside.
    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

/// Event derived from the last two points of a series or from the last
/// close against a range box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "direction", rename_all = "snake_case")]
pub enum RawEvent {
    EmaCross(Direction),
    MacdCross(Direction),
    BollingerCross(Direction),
    Breakout(Direction),
    ReentryIntoRange,
}

impl RawEvent {
    /// Direction carried by the event, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            RawEvent::EmaCross(d)
            | RawEvent::MacdCross(d)
            | RawEvent::BollingerCross(d)
            | RawEvent::Breakout(d) => Some(*d),
            RawEvent::ReentryIntoRange => None,
        }
    }

    /// Whether this is one of the two-line crossover events.
    pub fn is_crossover(&self) -> bool {
        matches!(
            self,
            RawEvent::EmaCross(_) | RawEvent::MacdCross(_) | RawEvent::BollingerCross(_)
        )
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawEvent::EmaCross(d) => write!(f, "EMA cross {}", d),
            RawEvent::MacdCross(d) => write!(f, "MACD cross {}", d),
            RawEvent::BollingerCross(d) => write!(f, "Bollinger cross {}", d),
            RawEvent::Breakout(Direction::Bullish) => write!(f, "breakout up"),
            RawEvent::Breakout(Direction::Bearish) => write!(f, "breakout down"),
            RawEvent::ReentryIntoRange => write!(f, "re-entry into range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_box_validity() {
        assert!(RangeBox::new(105.0, 98.0).is_valid());
        assert!(!RangeBox::new(100.0, 100.0).is_valid());
        assert!(!RangeBox::new(f64::NAN, 98.0).is_valid());
        assert!(!RangeBox::new(f64::INFINITY, 98.0).is_valid());
        assert!(!RangeBox::new(98.0, 105.0).is_valid());
    }

    #[test]
    fn test_range_box_contains_bounds() {
        let b = RangeBox::new(105.0, 98.0);
        assert!(b.contains(98.0));
        assert!(b.contains(105.0));
        assert!(!b.contains(105.0001));
        assert!(!b.contains(97.9));
    }

    #[test]
    fn test_event_direction() {
        assert_eq!(RawEvent::MacdCross(Direction::Bearish).direction(), Some(Direction::Bearish));
        assert_eq!(RawEvent::ReentryIntoRange.direction(), None);
        assert!(RawEvent::EmaCross(Direction::Bullish).is_crossover());
        assert!(!RawEvent::Breakout(Direction::Bullish).is_crossover());
    }
}
