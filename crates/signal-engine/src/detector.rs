//! Event detection from the last two indicator points and the last close.

use signal_core::types::{Direction, RangeBox, RawEvent};

use crate::policy::{PolicyConfig, Trigger};
use crate::snapshot::{IndicatorSnapshot, LinePair};

/// Two-line crossover over (previous, current) pairs.
///
/// Bullish iff the line was strictly below the reference and is now strictly
/// above it; bearish is the mirror. Any tie yields no crossover.
pub fn crossover(line: (f64, f64), reference: (f64, f64)) -> Option<Direction> {
    let (prev_a, curr_a) = line;
    let (prev_b, curr_b) = reference;

    if prev_a < prev_b && curr_a > curr_b {
        Some(Direction::Bullish)
    } else if prev_a > prev_b && curr_a < curr_b {
        Some(Direction::Bearish)
    } else {
        None
    }
}

/// Close strictly outside an envelope. Invalid boxes classify nothing.
pub fn breakout(close: f64, range: &RangeBox) -> Option<Direction> {
    if !range.is_valid() {
        return None;
    }
    if close > range.high {
        Some(Direction::Bullish)
    } else if close < range.low {
        Some(Direction::Bearish)
    } else {
        None
    }
}

/// Close inside or on the envelope. Invalid boxes classify nothing.
pub fn is_reentry(close: f64, range: &RangeBox) -> bool {
    range.is_valid() && range.contains(close)
}

/// Whether the current relation of a line pair points in `direction`.
pub fn agrees(pair: &LinePair, direction: Direction) -> bool {
    let (_, line) = pair.line;
    let (_, reference) = pair.reference;
    match direction {
        Direction::Bullish => line > reference,
        Direction::Bearish => line < reference,
    }
}

/// Raw event for a crossover of `trigger`.
pub fn crossover_event(trigger: Trigger, direction: Direction) -> RawEvent {
    match trigger {
        Trigger::Macd => RawEvent::MacdCross(direction),
        Trigger::EmaCross => RawEvent::EmaCross(direction),
        Trigger::EmaBollinger => RawEvent::BollingerCross(direction),
    }
}

/// All raw events visible in a snapshot for this policy.
pub fn detect(snapshot: &IndicatorSnapshot, policy: &PolicyConfig) -> Vec<RawEvent> {
    let mut events = Vec::with_capacity(3);

    if let Some(d) = crossover(snapshot.trigger.line, snapshot.trigger.reference) {
        events.push(crossover_event(policy.trigger, d));
    }
    if let (Some(companion), Some(pair)) = (policy.companion, snapshot.companion.as_ref()) {
        if let Some(d) = crossover(pair.line, pair.reference) {
            events.push(crossover_event(companion, d));
        }
    }
    if let Some(range) = snapshot.valid_range() {
        if let Some(d) = breakout(snapshot.close, range) {
            events.push(RawEvent::Breakout(d));
        } else if is_reentry(snapshot.close, range) {
            events.push(RawEvent::ReentryIntoRange);
        }
    }

    events
}
