//! Confirmation policies.
//!
//! Every deployment variant is one [`PolicyConfig`]: a kind that fixes the
//! confirmation shape, the crossover that triggers it, an optional companion
//! crossover that must agree, and an optional ADX gate.

use serde::{Deserialize, Serialize};
use signal_core::error::EngineError;
use signal_core::types::RawEvent;
use std::fmt;

/// Shape of the confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Emit whenever the trigger crossover direction differs from the last
    /// emitted direction.
    CrossoverOnly,
    /// Emit when the trigger crossover and a same-direction breakout happen
    /// on the same candle. Re-entry into the box clears the notified flag.
    CrossoverWithBreakout,
    /// A crossover arms the key; a later same-direction breakout confirms.
    ArmThenBreakout,
}

impl PolicyKind {
    /// Whether the range box takes part in decisions.
    pub fn uses_range(&self) -> bool {
        !matches!(self, PolicyKind::CrossoverOnly)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::CrossoverOnly => write!(f, "crossover only"),
            PolicyKind::CrossoverWithBreakout => write!(f, "crossover with breakout"),
            PolicyKind::ArmThenBreakout => write!(f, "arm then breakout"),
        }
    }
}

/// Two-line crossover that drives a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// MACD line against its signal line
    Macd,
    /// Fast EMA against slow EMA
    EmaCross,
    /// Fast EMA against the Bollinger middle band
    EmaBollinger,
}

impl Trigger {
    /// Whether `event` is this trigger's crossover.
    pub fn matches(&self, event: &RawEvent) -> bool {
        matches!(
            (self, event),
            (Trigger::Macd, RawEvent::MacdCross(_))
                | (Trigger::EmaCross, RawEvent::EmaCross(_))
                | (Trigger::EmaBollinger, RawEvent::BollingerCross(_))
        )
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Macd => write!(f, "MACD"),
            Trigger::EmaCross => write!(f, "EMA cross"),
            Trigger::EmaBollinger => write!(f, "EMA x BB"),
        }
    }
}

/// A complete confirmation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Name reported on emitted signals
    pub name: String,
    pub kind: PolicyKind,
    pub trigger: Trigger,
    /// Second crossover whose lines must agree with the trigger direction
    pub companion: Option<Trigger>,
    /// Minimum ADX required to emit
    pub min_adx: Option<f64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            name: "arm_then_breakout".to_string(),
            kind: PolicyKind::ArmThenBreakout,
            trigger: Trigger::Macd,
            companion: None,
            min_adx: None,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidConfig("Policy name must not be empty".into()));
        }
        if self.companion == Some(self.trigger) {
            return Err(EngineError::InvalidConfig(
                "Companion crossover must differ from the trigger".into(),
            ));
        }
        if let Some(min_adx) = self.min_adx {
            if !(0.0..=100.0).contains(&min_adx) {
                return Err(EngineError::InvalidConfig(format!(
                    "Minimum ADX must be within [0, 100], got {}",
                    min_adx
                )));
            }
        }
        Ok(())
    }

    /// Crossovers whose lines must be computed for this policy.
    pub fn crossovers(&self) -> impl Iterator<Item = Trigger> {
        std::iter::once(self.trigger).chain(self.companion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::types::Direction;

    #[test]
    fn test_trigger_matches_event() {
        assert!(Trigger::Macd.matches(&RawEvent::MacdCross(Direction::Bullish)));
        assert!(!Trigger::Macd.matches(&RawEvent::EmaCross(Direction::Bullish)));
        assert!(Trigger::EmaBollinger.matches(&RawEvent::BollingerCross(Direction::Bearish)));
        assert!(!Trigger::EmaCross.matches(&RawEvent::ReentryIntoRange));
    }

    #[test]
    fn test_policy_validation() {
        assert!(PolicyConfig::default().validate().is_ok());

        let same = PolicyConfig {
            companion: Some(Trigger::Macd),
            ..PolicyConfig::default()
        };
        assert!(same.validate().is_err());

        let gate = PolicyConfig {
            min_adx: Some(120.0),
            ..PolicyConfig::default()
        };
        assert!(gate.validate().is_err());
    }

    #[test]
    fn test_crossovers_include_companion() {
        let policy = PolicyConfig {
            companion: Some(Trigger::EmaBollinger),
            ..PolicyConfig::default()
        };
        let triggers: Vec<Trigger> = policy.crossovers().collect();
        assert_eq!(triggers, vec![Trigger::Macd, Trigger::EmaBollinger]);
    }
}
