//! The keyed signal engine.
//!
//! One [`SignalEngine`] is built at startup with an entry for every tracked
//! (instrument, timeframe). Each entry owns its configuration and, behind its
//! own lock, the deduplication state, so different keys can be evaluated
//! from different tasks while a single key is only ever mutated by one
//! evaluation at a time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use signal_core::error::EngineError;
use signal_core::types::{Candle, Direction, RawEvent, SeriesKey, Signal, SignalSide};
use signal_indicators::{BatchTails, IndicatorCache, SeriesTails};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::detector::detect;
use crate::machine::{step, Observation, Transition};
use crate::policy::{PolicyConfig, PolicyKind};
use crate::snapshot::IndicatorSnapshot;
pub use crate::snapshot::SkipReason;
use crate::state::{Phase, SignalState};
use crate::targets::compute_targets;

/// Result of evaluating one candle window.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Not ready or malformed; the key's state was not touched.
    Skipped(SkipReason),
    Evaluated(EvaluationReport),
}

/// Details of an evaluation that reached the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub events: Vec<RawEvent>,
    pub transition: Transition,
    /// Phase after the transition
    pub phase: Phase,
    pub signal: Option<Signal>,
}

impl Evaluation {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Evaluation::Evaluated(report) => report.signal.as_ref(),
            Evaluation::Skipped(_) => None,
        }
    }

    pub fn into_signal(self) -> Option<Signal> {
        match self {
            Evaluation::Evaluated(report) => report.signal,
            Evaluation::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Evaluation::Skipped(_))
    }
}

#[derive(Debug)]
struct KeyState {
    state: SignalState,
    cache: Option<IndicatorCache>,
}

#[derive(Debug)]
struct KeySlot {
    config: EngineConfig,
    inner: Mutex<KeyState>,
}

impl KeySlot {
    fn lock(&self) -> MutexGuard<'_, KeyState> {
        // Transitions are applied after all indicator math, so a poisoned
        // state is still a consistent one.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owner of every tracked key's state.
#[derive(Debug)]
pub struct SignalEngine {
    slots: HashMap<SeriesKey, KeySlot>,
}

impl SignalEngine {
    /// Build an engine with one idle state per key.
    pub fn new<I>(keys: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (SeriesKey, EngineConfig)>,
    {
        let mut slots = HashMap::new();
        for (key, config) in keys {
            config
                .validate()
                .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", key, e)))?;
            let cache = config.incremental.then(IndicatorCache::new);
            slots.insert(
                key,
                KeySlot {
                    config,
                    inner: Mutex::new(KeyState {
                        state: SignalState::default(),
                        cache,
                    }),
                },
            );
        }
        Ok(Self { slots })
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.slots.keys()
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn config(&self, key: &SeriesKey) -> Option<&EngineConfig> {
        self.slots.get(key).map(|slot| &slot.config)
    }

    /// Copy of a key's current state.
    pub fn state(&self, key: &SeriesKey) -> Option<SignalState> {
        self.slots.get(key).map(|slot| slot.lock().state)
    }

    /// Evaluate the newest candle of `candles` for `key`.
    ///
    /// `candles` must be oldest first. A window that is too short or breaks
    /// the ordering contract is reported as [`Evaluation::Skipped`].
    pub fn evaluate(&self, key: &SeriesKey, candles: &[Candle]) -> Result<Evaluation, EngineError> {
        let slot = self
            .slots
            .get(key)
            .ok_or_else(|| EngineError::UnknownKey(key.to_string()))?;
        let config = &slot.config;

        let mut guard = slot.lock();
        let KeyState { state, cache } = &mut *guard;

        let mut batch = BatchTails;
        let tails: &mut dyn SeriesTails = match cache.as_mut() {
            Some(cache) => cache,
            None => &mut batch,
        };

        let snapshot = match IndicatorSnapshot::compute(candles, config, tails) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                debug!(key = %key, %reason, "Skipping evaluation");
                return Ok(Evaluation::Skipped(reason));
            }
        };

        let events = detect(&snapshot, &config.policy);
        let observation = Observation::from_events(&snapshot, &events, &config.policy);
        if events.iter().any(|e| config.policy.trigger.matches(e)) && observation.crossover.is_none() {
            debug!(key = %key, "Trigger crossover ignored, companion disagrees");
        }

        let before = state.phase();
        let transition = step(state, config.policy.kind, &observation);
        let phase = state.phase();

        let signal = match transition {
            Transition::Emit(direction) => Some(build_signal(key, config, &snapshot, direction)),
            _ => None,
        };

        match transition {
            Transition::Armed(direction) => {
                info!(key = %key, %direction, from = %before, "Armed");
            }
            Transition::Reset => {
                info!(key = %key, from = %before, "Price back inside range, reset");
            }
            Transition::Emit(direction) => {
                info!(key = %key, %direction, price = snapshot.close, "Signal emitted");
            }
            Transition::Suppressed(direction) => {
                debug!(key = %key, %direction, adx = ?snapshot.adx, "Emission held back by ADX gate");
            }
            Transition::Unchanged => {
                debug!(key = %key, phase = %phase, events = events.len(), "No transition");
            }
        }

        Ok(Evaluation::Evaluated(EvaluationReport {
            events,
            transition,
            phase,
            signal,
        }))
    }
}

fn build_signal(
    key: &SeriesKey,
    config: &EngineConfig,
    snapshot: &IndicatorSnapshot,
    direction: Direction,
) -> Signal {
    let side = SignalSide::from(direction);
    let (target_price, stop_price) = compute_targets(
        side,
        snapshot.close,
        snapshot.valid_range(),
        &config.targets,
    );

    Signal {
        id: Uuid::new_v4(),
        instrument: key.instrument.clone(),
        timeframe: key.timeframe,
        side,
        reference_price: snapshot.close,
        candle_time: snapshot.time,
        supporting_indicators: snapshot.supporting.clone(),
        target_price,
        stop_price,
        policy: config.policy.name.clone(),
        reason: describe(&config.policy, direction),
    }
}

fn describe(policy: &PolicyConfig, direction: Direction) -> String {
    let breakout = match direction {
        Direction::Bullish => "breakout up",
        Direction::Bearish => "breakout down",
    };
    let mut reason = match policy.kind {
        PolicyKind::CrossoverOnly => format!("{} {} crossover", policy.trigger, direction),
        PolicyKind::CrossoverWithBreakout => {
            format!("{} {} crossover with {}", policy.trigger, direction, breakout)
        }
        PolicyKind::ArmThenBreakout => {
            format!("{} after {} {} crossover", breakout, policy.trigger, direction)
        }
    };
    if let Some(companion) = policy.companion {
        reason.push_str(&format!(", {} agrees", companion));
    }
    if let Some(min_adx) = policy.min_adx {
        reason.push_str(&format!(", ADX >= {}", min_adx));
    }
    reason
}
