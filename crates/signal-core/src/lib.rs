//! Core types and traits for the signal alerting system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Timeframe)
//! - Detection types (Direction, RangeBox, RawEvent)
//! - Emitted signals and the keys they are tracked under
//! - Seam traits for indicators, candle sources and notifiers

pub mod error;
pub mod traits;
pub mod types;

pub use error::{SignalError, SignalResult};
pub use traits::*;
pub use types::*;
