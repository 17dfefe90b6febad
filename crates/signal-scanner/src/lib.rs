//! Poll loop over every tracked (instrument, timeframe).
//!
//! Each tick fetches candles for every key, evaluates them with the shared
//! [`SignalEngine`](signal_engine::SignalEngine) and delivers emitted signals.
//! A failing key is logged and counted; the other keys are unaffected.

mod scanner;

pub use scanner::{KeyOutcome, Scanner, ScannerConfig, TickResult};
