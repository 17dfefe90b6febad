//! Trailing range box.

use signal_core::types::{Candle, RangeBox};

/// High/low envelope of the `lookback` candles before the newest one.
///
/// The newest candle is the one being evaluated, so it never contributes to
/// its own box. Needs `lookback + 1` candles; returns `None` otherwise. The
/// returned box may still be invalid (flat or non-finite), callers check
/// [`RangeBox::is_valid`] before using it.
pub fn range_box(candles: &[Candle], lookback: usize) -> Option<RangeBox> {
    if lookback == 0 || candles.len() < lookback + 1 {
        return None;
    }

    let end = candles.len() - 1;
    let window = &candles[end - lookback..end];

    let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    Some(RangeBox::new(high, low))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, high: f64, low: f64) -> Candle {
        Candle::new(time, low, high, low, (high + low) / 2.0, 1.0)
    }

    #[test]
    fn test_box_excludes_current_candle() {
        let mut candles: Vec<Candle> = (0..9)
            .map(|i| candle(i, 100.0 + (i % 3) as f64, 99.0 - (i % 2) as f64))
            .collect();
        candles[4] = candle(4, 105.0, 98.0);
        // The newest candle spikes far outside
        candles.push(candle(9, 130.0, 60.0));

        let b = range_box(&candles, 9).unwrap();
        assert_eq!(b.high, 105.0);
        assert_eq!(b.low, 98.0);
        assert_eq!(b.size, 7.0);
        assert!(b.is_valid());
    }

    #[test]
    fn test_box_needs_lookback_plus_one() {
        let candles: Vec<Candle> = (0..10).map(|i| candle(i, 101.0, 99.0)).collect();
        assert!(range_box(&candles, 10).is_none());
        assert!(range_box(&candles, 9).is_some());
        assert!(range_box(&candles, 0).is_none());
    }

    #[test]
    fn test_flat_box_is_invalid() {
        let candles: Vec<Candle> = (0..6).map(|i| candle(i, 100.0, 100.0)).collect();
        let b = range_box(&candles, 5).unwrap();
        assert_eq!(b.size, 0.0);
        assert!(!b.is_valid());
    }
}
