//! Named policy presets.

use serde::{Deserialize, Serialize};
use signal_core::error::EngineError;
use std::collections::BTreeMap;

use crate::config::{EngineConfig, IndicatorPeriods};
use crate::policy::{PolicyConfig, PolicyKind, Trigger};

/// A registered preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    /// Preset name, also reported on emitted signals
    pub name: String,
    /// Preset description
    pub description: String,
    /// Default configuration
    pub config: EngineConfig,
}

/// Registry of the built-in policy presets.
pub struct PolicyRegistry {
    presets: BTreeMap<String, PresetInfo>,
}

fn preset(
    name: &str,
    description: &str,
    kind: PolicyKind,
    trigger: Trigger,
    companion: Option<Trigger>,
    min_adx: Option<f64>,
    periods: IndicatorPeriods,
) -> PresetInfo {
    PresetInfo {
        name: name.to_string(),
        description: description.to_string(),
        config: EngineConfig {
            periods,
            policy: PolicyConfig {
                name: name.to_string(),
                kind,
                trigger,
                companion,
                min_adx,
            },
            ..EngineConfig::default()
        },
    }
}

impl PolicyRegistry {
    /// Create a registry with all built-in presets.
    pub fn new() -> Self {
        let slow_macd = IndicatorPeriods {
            macd_fast: 26,
            macd_slow: 50,
            macd_signal: 9,
            ..IndicatorPeriods::default()
        };

        let presets = [
            preset(
                "macd_crossover",
                "Signals every MACD 12/26/9 crossover that flips direction",
                PolicyKind::CrossoverOnly,
                Trigger::Macd,
                None,
                None,
                IndicatorPeriods::default(),
            ),
            preset(
                "ema_crossover",
                "Signals every EMA 12/26 crossover that flips direction",
                PolicyKind::CrossoverOnly,
                Trigger::EmaCross,
                None,
                None,
                IndicatorPeriods::default(),
            ),
            preset(
                "ema_bollinger_breakout",
                "EMA 12 crossing the Bollinger middle band together with a range breakout",
                PolicyKind::CrossoverWithBreakout,
                Trigger::EmaBollinger,
                None,
                None,
                IndicatorPeriods::default(),
            ),
            preset(
                "macd_breakout",
                "MACD 26/50/9 crossover arms, a later range breakout confirms",
                PolicyKind::ArmThenBreakout,
                Trigger::Macd,
                None,
                None,
                slow_macd.clone(),
            ),
            preset(
                "macd_bollinger_breakout",
                "MACD 26/50/9 crossover arms when EMA 12 agrees with the Bollinger middle band, a breakout with the band still agreeing confirms",
                PolicyKind::ArmThenBreakout,
                Trigger::Macd,
                Some(Trigger::EmaBollinger),
                None,
                slow_macd,
            ),
            preset(
                "ema_adx",
                "EMA 12/26 crossovers while ADX shows a trend of at least 25",
                PolicyKind::CrossoverOnly,
                Trigger::EmaCross,
                None,
                Some(25.0),
                IndicatorPeriods::default(),
            ),
        ];

        Self {
            presets: presets
                .into_iter()
                .map(|info| (info.name.clone(), info))
                .collect(),
        }
    }

    /// List all presets, ordered by name.
    pub fn list(&self) -> Vec<&PresetInfo> {
        self.presets.values().collect()
    }

    pub fn get(&self, name: &str) -> Option<&PresetInfo> {
        self.presets.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Default configuration of a preset.
    pub fn config(&self, name: &str) -> Result<EngineConfig, EngineError> {
        self.get(name)
            .map(|info| info.config.clone())
            .ok_or_else(|| EngineError::PolicyNotFound(name.to_string()))
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_list() {
        let registry = PolicyRegistry::new();
        assert_eq!(registry.list().len(), 6);
        assert_eq!(registry.names()[0], "ema_adx");
    }

    #[test]
    fn test_all_presets_are_valid() {
        let registry = PolicyRegistry::new();
        for info in registry.list() {
            assert!(info.config.validate().is_ok(), "{} is invalid", info.name);
            assert_eq!(info.config.policy.name, info.name);
        }
    }

    #[test]
    fn test_preset_details() {
        let registry = PolicyRegistry::new();

        let slow = registry.config("macd_breakout").unwrap();
        assert_eq!(slow.periods.macd_slow, 50);
        assert_eq!(slow.policy.kind, PolicyKind::ArmThenBreakout);

        let gated = registry.config("ema_adx").unwrap();
        assert_eq!(gated.policy.min_adx, Some(25.0));

        let paired = registry.config("macd_bollinger_breakout").unwrap();
        assert_eq!(paired.policy.companion, Some(Trigger::EmaBollinger));
        assert_eq!(
            (paired.periods.macd_fast, paired.periods.macd_slow, paired.periods.macd_signal),
            (26, 50, 9)
        );
    }

    #[test]
    fn test_unknown_preset() {
        let registry = PolicyRegistry::new();
        assert!(registry.get("unknown").is_none());
        assert!(matches!(
            registry.config("unknown"),
            Err(EngineError::PolicyNotFound(name)) if name == "unknown"
        ));
    }
}
