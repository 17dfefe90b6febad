//! Core data types for the signal alerting system.

mod candle;
mod event;
mod signal;
mod timeframe;

pub use candle::{check_candles, closes, volumes, Candle, SeriesDefect};
pub use event::{Direction, RangeBox, RawEvent};
pub use signal::{SeriesKey, Signal, SignalSide};
pub use timeframe::Timeframe;
