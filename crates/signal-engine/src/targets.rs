//! Target and stop computation.

use serde::{Deserialize, Serialize};
use signal_core::error::EngineError;
use signal_core::types::{RangeBox, SignalSide};

/// Multipliers applied to the range box size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Target distance in box sizes
    pub target_multiplier: f64,
    /// Stop distance in box sizes
    pub stop_multiplier: f64,
    /// Band used in place of the box size when no valid box exists,
    /// as a fraction of the reference price
    pub fallback_band: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            target_multiplier: 1.0,
            stop_multiplier: 0.5,
            fallback_band: 0.01,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("target_multiplier", self.target_multiplier),
            ("stop_multiplier", self.stop_multiplier),
            ("fallback_band", self.fallback_band),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Target and stop prices for a signal at `reference`.
///
/// The distance unit is the box size when the box is valid, otherwise
/// `fallback_band * reference`.
pub fn compute_targets(
    side: SignalSide,
    reference: f64,
    range: Option<&RangeBox>,
    config: &TargetConfig,
) -> (f64, f64) {
    let unit = match range {
        Some(b) if b.is_valid() => b.size,
        _ => config.fallback_band * reference,
    };

    let target_offset = config.target_multiplier * unit;
    let stop_offset = config.stop_multiplier * unit;

    match side {
        SignalSide::Long => (reference + target_offset, reference - stop_offset),
        SignalSide::Short => (reference - target_offset, reference + stop_offset),
    }
}
