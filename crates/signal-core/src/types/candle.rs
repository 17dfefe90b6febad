//! OHLCV candle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One period of OHLCV data.
///
/// Produced by a candle source and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Period start, Unix milliseconds
    pub time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Calculate the candle's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Check if the candle closed above its open.
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if every price and the volume are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Get the period start as a DateTime.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }

    /// Calculate the true range against the previous close.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

/// Reasons a candle window cannot be evaluated as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesDefect {
    /// Timestamps are not strictly increasing at this index.
    OutOfOrder { index: usize },
    /// A price or volume at this index is NaN or infinite.
    NonFinite { index: usize },
}

impl std::fmt::Display for SeriesDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesDefect::OutOfOrder { index } => {
                write!(f, "candle {} is not newer than its predecessor", index)
            }
            SeriesDefect::NonFinite { index } => {
                write!(f, "candle {} has a non-finite price or volume", index)
            }
        }
    }
}

/// Check the ordering contract of a candle window: oldest first, strictly
/// increasing timestamps, finite values.
pub fn check_candles(candles: &[Candle]) -> Result<(), SeriesDefect> {
    for (index, candle) in candles.iter().enumerate() {
        if !candle.is_finite() {
            return Err(SeriesDefect::NonFinite { index });
        }
        if index > 0 && candle.time <= candles[index - 1].time {
            return Err(SeriesDefect::OutOfOrder { index });
        }
    }
    Ok(())
}

/// Extract close prices from a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract volumes from a candle slice.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_calculations() {
        let candle = Candle::new(1000, 100.0, 110.0, 95.0, 105.0, 1_000_000.0);

        assert!((candle.typical_price() - 103.333333).abs() < 0.001);
        assert!((candle.range() - 15.0).abs() < 0.001);
        assert!(candle.is_bullish());
        assert!(candle.is_finite());
    }

    #[test]
    fn test_candle_true_range() {
        let candle = Candle::new(1000, 100.0, 110.0, 95.0, 105.0, 1_000_000.0);

        assert!((candle.true_range(None) - 15.0).abs() < 0.001);
        // Gap below the previous close widens the range
        assert!((candle.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_check_candles() {
        let good = vec![
            Candle::new(1, 1.0, 2.0, 0.5, 1.5, 10.0),
            Candle::new(2, 1.5, 2.5, 1.0, 2.0, 10.0),
        ];
        assert_eq!(check_candles(&good), Ok(()));
        assert_eq!(check_candles(&[]), Ok(()));

        let duplicate = vec![good[0], good[0]];
        assert_eq!(
            check_candles(&duplicate),
            Err(SeriesDefect::OutOfOrder { index: 1 })
        );

        let mut nan = good.clone();
        nan[1].close = f64::NAN;
        assert_eq!(check_candles(&nan), Err(SeriesDefect::NonFinite { index: 1 }));
    }
}
