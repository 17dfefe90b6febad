//! Candle source trait definitions.

use crate::error::DataError;
use crate::types::{Candle, Timeframe};
use async_trait::async_trait;

/// Provider of recent candles for one instrument and timeframe.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to `limit` of the most recent candles.
    ///
    /// # Arguments
    /// * `instrument` - The instrument symbol
    /// * `timeframe` - The candle timeframe
    /// * `limit` - Maximum number of candles to return
    ///
    /// # Returns
    /// Candles ordered from oldest to newest with strictly increasing times
    async fn fetch_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;

    /// Get the name of the source.
    fn name(&self) -> &str;
}
