//! Volatility indicators.

use serde::{Deserialize, Serialize};
use signal_core::traits::MultiOutputIndicator;

/// Population mean and standard deviation of a window.
fn mean_std(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean: f64 = window.iter().sum::<f64>() / n;
    let variance: f64 = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Bandwidth ((upper - lower) / middle)
    pub bandwidth: f64,
}

/// Bollinger Bands.
///
/// Consists of a middle band (SMA) with upper and lower bands
/// at a specified number of standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        if data.len() < self.period {
            return vec![];
        }

        data.windows(self.period)
            .map(|window| {
                let (mean, std_dev) = mean_std(window);
                let upper = mean + self.std_dev_multiplier * std_dev;
                let lower = mean - self.std_dev_multiplier * std_dev;
                let bandwidth = if mean != 0.0 {
                    (upper - lower) / mean
                } else {
                    0.0
                };

                BollingerOutput {
                    upper,
                    middle: mean,
                    lower,
                    bandwidth,
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sma;
    use signal_core::traits::Indicator;

    #[test]
    fn test_band_width_uses_population_std_dev() {
        let (mean, sd) = mean_std(&[2.0, 4.0, 4.0, 6.0]);
        // mean 4, squared deviations 4+0+0+4 over 4
        assert_eq!(mean, 4.0);
        assert!((sd - 2.0_f64.sqrt()).abs() < 1e-12);

        let bands = BollingerBands::with_params(4, 2.0).calculate(&[2.0, 4.0, 4.0, 6.0]);
        assert_eq!(bands.len(), 1);
        assert!((bands[0].upper - (4.0 + 2.0 * 2.0_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_middle_is_sma() {
        let data: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 3.0)
            .collect();
        let bands = BollingerBands::with_params(20, 2.0).calculate(&data);
        let sma = Sma::new(20).calculate(&data);

        assert_eq!(bands.len(), sma.len());
        for (band, avg) in bands.iter().zip(sma.iter()) {
            assert!((band.middle - avg).abs() < 1e-9);
            assert!(band.upper >= band.middle && band.middle >= band.lower);
        }
    }

    #[test]
    fn test_bollinger_flat_series_collapses() {
        let bands = BollingerBands::new().calculate(&[50.0; 25]);
        let last = bands.last().unwrap();
        assert_eq!(last.upper, 50.0);
        assert_eq!(last.lower, 50.0);
        assert_eq!(last.bandwidth, 0.0);
    }
}
