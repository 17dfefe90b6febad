//! Core traits for the signal alerting system.

mod candle_source;
mod indicator;
mod notifier;

pub use candle_source::CandleSource;
pub use indicator::{CandleIndicator, Indicator, MultiOutputIndicator, StreamingIndicator};
pub use notifier::Notifier;
