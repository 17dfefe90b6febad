//! Indicator trait definitions.

use crate::types::Candle;

/// Trait for technical indicators over a price series.
///
/// Indicators process price data and produce derived values
/// useful for signal decisions.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data, oldest first (typically closes)
    ///
    /// # Returns
    /// One value per position at which the indicator is defined, so the
    /// last element always aligns with the last input
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Streaming indicator that maintains internal state.
///
/// Fed the same values in the same order, a streaming indicator yields the
/// same numbers as its batch counterpart.
pub trait StreamingIndicator: Send + Sync {
    /// The input consumed per update.
    type Input;
    /// The output type of the indicator.
    type Output;

    /// Update the indicator with a new value.
    ///
    /// # Returns
    /// The current indicator value, or None if not yet ready
    fn update(&mut self, input: Self::Input) -> Option<Self::Output>;

    /// Get the current value without adding new data.
    fn current(&self) -> Option<Self::Output>;

    /// Reset the indicator state.
    fn reset(&mut self);

    /// Check if the indicator has enough data to produce values.
    fn is_ready(&self) -> bool;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Multi-output indicator (e.g., Bollinger Bands, MACD).
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple values.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Indicator that needs full candles rather than a single price column.
pub trait CandleIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from candles, oldest first.
    fn calculate(&self, candles: &[Candle]) -> Vec<Self::Output>;

    /// Get the minimum number of candles required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}
