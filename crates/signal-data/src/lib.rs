//! Candle sources.
//!
//! - [`BybitSource`]: recent klines from the Bybit v5 REST API
//! - [`CsvCandleSource`]: historical candles from a CSV file

mod bybit;
mod csv_source;

pub use bybit::{interval, BybitConfig, BybitSource, BYBIT_BASE_URL, MAX_LIMIT};
pub use csv_source::CsvCandleSource;

use signal_core::error::DataError;
use signal_core::types::Candle;
use std::path::Path;

/// Load every candle from a CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    CsvCandleSource::new(path)?.load_all()
}
