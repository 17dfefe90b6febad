//! Per-key engine configuration.

use serde::{Deserialize, Serialize};
use signal_core::error::EngineError;

use crate::policy::{PolicyConfig, Trigger};
use crate::targets::TargetConfig;

/// Indicator periods used by one tracked series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    /// Fast EMA (EMA cross and EMA x BB triggers)
    pub ema_fast: usize,
    /// Slow EMA (EMA cross trigger)
    pub ema_slow: usize,
    /// Long EMAs reported for context only
    pub context_emas: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub adx: usize,
    /// Candles before the newest one that make up the range box
    pub box_lookback: usize,
    /// Window of the volume average
    pub volume_period: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema_fast: 12,
            ema_slow: 26,
            context_emas: vec![50, 200],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi: 14,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            adx: 14,
            box_lookback: 20,
            volume_period: 20,
        }
    }
}

impl IndicatorPeriods {
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("rsi", self.rsi),
            ("adx", self.adx),
            ("box_lookback", self.box_lookback),
            ("volume_period", self.volume_period),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        if self.context_emas.iter().any(|&p| p == 0) {
            return Err(EngineError::InvalidConfig(
                "Context EMA periods must be greater than 0".into(),
            ));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(EngineError::InvalidConfig(
                "Fast EMA period must be less than slow EMA period".into(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(EngineError::InvalidConfig(
                "MACD fast period must be less than slow period".into(),
            ));
        }
        if self.bollinger_period < 2 {
            return Err(EngineError::InvalidConfig(
                "Bollinger period must be at least 2".into(),
            ));
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "Bollinger multiplier must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Candles needed for two points of a trigger's lines.
    pub fn crossover_window(&self, trigger: Trigger) -> usize {
        match trigger {
            Trigger::Macd => self.macd_slow + self.macd_signal,
            Trigger::EmaCross => self.ema_slow + 1,
            Trigger::EmaBollinger => self.ema_fast.max(self.bollinger_period) + 1,
        }
    }
}

/// Everything the engine needs to decide for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Keep streaming EMA/RSI/ADX accumulators between evaluations
    pub incremental: bool,
    pub periods: IndicatorPeriods,
    pub policy: PolicyConfig,
    pub targets: TargetConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.periods.validate()?;
        self.policy.validate()?;
        self.targets.validate()?;
        Ok(())
    }

    /// Minimum window for a decision.
    ///
    /// Only decision inputs count: the trigger and companion crossovers, the
    /// ADX gate and, for breakout policies, the range box. Context values
    /// are reported when available.
    pub fn min_candles(&self) -> usize {
        let mut required = self
            .policy
            .crossovers()
            .map(|t| self.periods.crossover_window(t))
            .max()
            .unwrap_or(2);

        if self.policy.min_adx.is_some() {
            required = required.max(2 * self.periods.adx);
        }
        if self.policy.kind.uses_range() {
            required = required.max(self.periods.box_lookback + 1);
        }
        required
    }

    /// Candles worth requesting so every context value can be reported.
    pub fn preferred_candles(&self) -> usize {
        let context = self.periods.context_emas.iter().copied().max().unwrap_or(0);
        self.min_candles()
            .max(context + 1)
            .max(self.periods.rsi + 1)
            .max(2 * self.periods.adx)
            .max(self.periods.volume_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyKind;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_period_validation() {
        let mut periods = IndicatorPeriods::default();
        periods.ema_fast = 26;
        assert!(periods.validate().is_err());

        let mut periods = IndicatorPeriods::default();
        periods.macd_signal = 0;
        assert!(periods.validate().is_err());

        let mut periods = IndicatorPeriods::default();
        periods.context_emas = vec![50, 0];
        assert!(periods.validate().is_err());
    }

    #[test]
    fn test_min_candles_by_policy() {
        // MACD 12/26/9 two points, box of 20 plus the evaluated candle
        let config = EngineConfig::default();
        assert_eq!(config.min_candles(), 35);

        let mut slow = EngineConfig::default();
        slow.periods.macd_fast = 26;
        slow.periods.macd_slow = 50;
        assert_eq!(slow.min_candles(), 59);

        let mut gated = EngineConfig::default();
        gated.policy.kind = PolicyKind::CrossoverOnly;
        gated.policy.trigger = Trigger::EmaCross;
        gated.policy.min_adx = Some(25.0);
        assert_eq!(gated.min_candles(), 28);

        gated.policy.min_adx = None;
        assert_eq!(gated.min_candles(), 27);
    }

    #[test]
    fn test_preferred_candles_cover_context() {
        assert_eq!(EngineConfig::default().preferred_candles(), 201);
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            [periods]
            macd_fast = 26
            macd_slow = 50

            [policy]
            name = "macd_breakout"
            kind = "arm_then_breakout"
            trigger = "macd"
            "#,
        )
        .unwrap();

        assert_eq!(config.periods.macd_slow, 50);
        assert_eq!(config.periods.macd_signal, 9);
        assert_eq!(config.targets, TargetConfig::default());
        assert!(config.validate().is_ok());
    }
}
