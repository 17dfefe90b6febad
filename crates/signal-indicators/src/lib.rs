//! Technical indicators for the signal engine.
//!
//! This crate provides the pure indicator calculations:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (Bollinger Bands)
//! - Trend strength (ADX)
//! - The trailing range box used as a breakout reference
//!
//! Batch indicators recompute from the full window they are given. EMA, RSI
//! and ADX also have streaming accumulators that reproduce the batch numbers
//! exactly, and [`IndicatorCache`] keeps them per period for one series.

pub mod cache;
pub mod momentum;
pub mod moving_average;
pub mod range;
pub mod trend;
pub mod volatility;

pub use cache::{BatchTails, IndicatorCache, SeriesTails};
pub use momentum::{Macd, MacdOutput, Rsi, RsiZone, StreamingRsi};
pub use moving_average::{Ema, Sma, StreamingEma};
pub use range::range_box;
pub use trend::{Adx, AdxOutput, StreamingAdx};
pub use volatility::{BollingerBands, BollingerOutput};

/// Last two points of a series, oldest first.
pub fn last_two<T: Copy>(values: &[T]) -> Option<(T, T)> {
    match values {
        [.., prev, curr] => Some((*prev, *curr)),
        _ => None,
    }
}
