//! Signal state machine.
//!
//! One transition per evaluated window. The machine only gates repeated
//! observations; it never looks at indicator values directly.

use signal_core::types::{Direction, RawEvent};

use crate::detector::agrees;
use crate::policy::{PolicyConfig, PolicyKind};
use crate::snapshot::IndicatorSnapshot;
use crate::state::{Phase, SignalState};

/// What the machine sees for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    /// Trigger crossover, dropped when a companion disagrees
    pub crossover: Option<Direction>,
    pub breakout: Option<Direction>,
    pub reentry: bool,
    /// ADX gate satisfied (always true without a gate)
    pub trend_ok: bool,
    /// Whether the policy pairs the trigger with a companion
    pub has_companion: bool,
    /// Side the companion lines currently point to, `None` when level
    pub companion: Option<Direction>,
}

impl Observation {
    pub fn from_events(snapshot: &IndicatorSnapshot, events: &[RawEvent], policy: &PolicyConfig) -> Self {
        let has_companion = snapshot.companion.is_some();
        let companion = snapshot.companion.as_ref().and_then(|pair| {
            [Direction::Bullish, Direction::Bearish]
                .into_iter()
                .find(|&d| agrees(pair, d))
        });

        let mut obs = Self {
            crossover: None,
            breakout: events.iter().find_map(|e| match e {
                RawEvent::Breakout(d) => Some(*d),
                _ => None,
            }),
            reentry: events.contains(&RawEvent::ReentryIntoRange),
            trend_ok: match policy.min_adx {
                Some(min) => snapshot.adx.map_or(false, |adx| adx >= min),
                None => true,
            },
            has_companion,
            companion,
        };
        obs.crossover = events
            .iter()
            .find(|e| policy.trigger.matches(e))
            .and_then(RawEvent::direction)
            .filter(|&d| obs.companion_agrees(d));
        obs
    }

    /// True without a companion, otherwise when it points to `direction`.
    pub fn companion_agrees(&self, direction: Direction) -> bool {
        !self.has_companion || self.companion == Some(direction)
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// A new arming episode started (fresh arm or re-arm)
    Armed(Direction),
    /// Back to idle after re-entry into the range
    Reset,
    /// A signal must be emitted
    Emit(Direction),
    /// An emission was due but the ADX gate held it back
    Suppressed(Direction),
}

/// Apply one observation to a key's state.
pub fn step(state: &mut SignalState, kind: PolicyKind, obs: &Observation) -> Transition {
    match kind {
        PolicyKind::CrossoverOnly => crossover_only(state, obs),
        PolicyKind::CrossoverWithBreakout => crossover_with_breakout(state, obs),
        PolicyKind::ArmThenBreakout => arm_then_breakout(state, obs),
    }
}

fn emit(state: &mut SignalState, direction: Direction, trend_ok: bool) -> Transition {
    if !trend_ok {
        return Transition::Suppressed(direction);
    }
    state.notify(direction);
    Transition::Emit(direction)
}

fn crossover_only(state: &mut SignalState, obs: &Observation) -> Transition {
    match obs.crossover {
        Some(d) if state.last_emitted != Some(d) => emit(state, d, obs.trend_ok),
        _ => Transition::Unchanged,
    }
}

fn crossover_with_breakout(state: &mut SignalState, obs: &Observation) -> Transition {
    if obs.reentry {
        return if state.notified {
            state.reset();
            Transition::Reset
        } else {
            Transition::Unchanged
        };
    }

    match (obs.crossover, obs.breakout) {
        (Some(c), Some(b)) if c == b && (!state.notified || state.last_emitted != Some(c)) => {
            emit(state, c, obs.trend_ok)
        }
        _ => Transition::Unchanged,
    }
}

fn arm_then_breakout(state: &mut SignalState, obs: &Observation) -> Transition {
    match state.phase() {
        Phase::Idle => match obs.crossover {
            Some(c) => {
                state.arm(c);
                Transition::Armed(c)
            }
            None => Transition::Unchanged,
        },
        Phase::Armed(armed) => {
            // A crossover only arms, even when a breakout shows up on the same candle
            if let Some(c) = obs.crossover {
                state.arm(c);
                return Transition::Armed(c);
            }
            match obs.breakout {
                Some(b) if b == armed && obs.companion_agrees(b) => emit(state, b, obs.trend_ok),
                // The companion must still agree when the breakout confirms
                Some(b) if b == armed => {
                    state.breakout_seen = true;
                    Transition::Unchanged
                }
                Some(b) => {
                    state.arm(b);
                    state.breakout_seen = true;
                    Transition::Armed(b)
                }
                None if obs.reentry && state.breakout_seen => {
                    state.reset();
                    Transition::Reset
                }
                None => Transition::Unchanged,
            }
        }
        Phase::Notified(notified) => match obs.crossover {
            Some(c) if c != notified => {
                state.arm(c);
                Transition::Armed(c)
            }
            _ if obs.reentry => {
                state.reset();
                Transition::Reset
            }
            _ => Transition::Unchanged,
        },
    }
}
