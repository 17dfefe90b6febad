//! End-to-end scenarios driving the engine tick by tick over growing windows.

use std::sync::Arc;
use std::thread;

use signal_core::types::{Candle, Direction, SeriesKey, SignalSide, Timeframe};
use signal_engine::{
    EngineConfig, Evaluation, IndicatorPeriods, Phase, PolicyConfig, PolicyKind, SignalEngine,
    Transition, Trigger,
};

const HOUR: i64 = 3_600_000;

/// Price path with an EMA 3/6 bullish crossover at tick 10 inside a
/// [98, 105] box, a breakout at tick 11, a climb through tick 20, a close
/// back inside the trailing box at tick 21 and a bearish crossover at 22.
fn scenario_candles() -> Vec<Candle> {
    // (close, high, low)
    let mut rows: Vec<(f64, f64, f64)> = vec![
        (104.0, 104.5, 103.5),
        (103.5, 104.0, 103.0),
        (103.0, 105.0, 102.5),
        (102.0, 102.5, 101.5),
        (101.0, 101.5, 100.5),
        (100.0, 100.5, 99.5),
        (99.5, 100.0, 99.0),
        (99.0, 99.5, 98.0),
        (99.0, 99.5, 98.5),
        (99.5, 100.0, 99.0),
        (102.5, 103.0, 102.0),
        (106.0, 106.0, 105.0),
    ];
    for i in 0..9 {
        let close = 106.5 + 0.5 * i as f64;
        rows.push((close, close, close - 1.0));
    }
    rows.push((108.0, 108.5, 107.5));
    rows.push((106.0, 106.5, 105.5));
    rows.push((100.0, 100.5, 99.5));

    let mut open = rows[0].0;
    rows.into_iter()
        .enumerate()
        .map(|(i, (close, high, low))| {
            let candle = Candle::new(i as i64 * HOUR, open, high.max(open), low.min(open), close, 1000.0);
            open = close;
            candle
        })
        .collect()
}

fn scenario_config(incremental: bool) -> EngineConfig {
    EngineConfig {
        periods: IndicatorPeriods {
            ema_fast: 3,
            ema_slow: 6,
            context_emas: vec![],
            box_lookback: 9,
            ..IndicatorPeriods::default()
        },
        policy: PolicyConfig {
            name: "ema_breakout".to_string(),
            kind: PolicyKind::ArmThenBreakout,
            trigger: Trigger::EmaCross,
            companion: None,
            min_adx: None,
        },
        incremental,
        ..EngineConfig::default()
    }
}

fn key() -> SeriesKey {
    SeriesKey::new("BTCUSDT", Timeframe::Hour1)
}

/// Evaluate every prefix window, oldest tick first.
fn replay(engine: &SignalEngine, key: &SeriesKey, candles: &[Candle]) -> Vec<(usize, Evaluation)> {
    (1..=candles.len())
        .map(|end| (end - 1, engine.evaluate(key, &candles[..end]).unwrap()))
        .collect()
}

fn transition(evaluation: &Evaluation) -> Option<Transition> {
    match evaluation {
        Evaluation::Evaluated(report) => Some(report.transition),
        Evaluation::Skipped(_) => None,
    }
}

#[test]
fn test_arm_breakout_end_to_end() {
    // Open/high/low adjustments must not move the box away from [98, 105]
    let candles = scenario_candles();
    assert!(candles.iter().skip(2).take(9).all(|c| c.high <= 105.0 && c.low >= 98.0));
    assert_eq!(candles[11].open, 102.5);

    let engine = SignalEngine::new([(key(), scenario_config(false))]).unwrap();
    let results = replay(&engine, &key(), &candles[..=21]);

    // Not enough candles for the crossover and the box before tick 9
    for (tick, evaluation) in &results[..9] {
        assert!(evaluation.is_skipped(), "tick {} should be skipped", tick);
    }

    assert_eq!(transition(&results[9].1), Some(Transition::Unchanged));
    assert_eq!(transition(&results[10].1), Some(Transition::Armed(Direction::Bullish)));
    assert_eq!(transition(&results[11].1), Some(Transition::Emit(Direction::Bullish)));

    let signals: Vec<_> = results
        .iter()
        .filter_map(|(tick, e)| e.signal().map(|s| (*tick, s.clone())))
        .collect();
    assert_eq!(signals.len(), 1);

    let (tick, signal) = &signals[0];
    assert_eq!(*tick, 11);
    assert_eq!(signal.side, SignalSide::Long);
    assert_eq!(signal.reference_price, 106.0);
    assert_eq!(signal.candle_time, 11 * HOUR);
    assert!((signal.target_price - 113.0).abs() < 1e-9);
    assert!((signal.stop_price - 102.5).abs() < 1e-9);
    assert_eq!(signal.indicator("box_high"), Some(105.0));
    assert_eq!(signal.indicator("box_low"), Some(98.0));
    assert!(signal.indicator("ema_3").is_some());
    assert_eq!(signal.policy, "ema_breakout");

    // Price keeps climbing above the box: nothing more
    for (tick, evaluation) in &results[12..=20] {
        assert_eq!(
            transition(evaluation),
            Some(Transition::Unchanged),
            "tick {} should be quiet",
            tick
        );
    }

    // Close back inside the trailing box
    assert_eq!(transition(&results[21].1), Some(Transition::Reset));
    let state = engine.state(&key()).unwrap();
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.last_emitted, Some(Direction::Bullish));
}

#[test]
fn test_rearm_after_reset() {
    let candles = scenario_candles();
    let engine = SignalEngine::new([(key(), scenario_config(false))]).unwrap();
    let results = replay(&engine, &key(), &candles);

    assert_eq!(transition(&results[22].1), Some(Transition::Armed(Direction::Bearish)));
    assert_eq!(transition(&results[23].1), Some(Transition::Emit(Direction::Bearish)));

    let short = results[23].1.signal().unwrap();
    assert_eq!(short.side, SignalSide::Short);
    assert!(short.target_price < short.reference_price);
    assert!(short.stop_price > short.reference_price);
    assert_eq!(engine.state(&key()).unwrap().phase(), Phase::Notified(Direction::Bearish));
}

#[test]
fn test_repeated_window_is_idempotent() {
    let candles = scenario_candles();
    let engine = SignalEngine::new([(key(), scenario_config(false))]).unwrap();

    replay(&engine, &key(), &candles[..=10]);
    let window = &candles[..=11];
    let first = engine.evaluate(&key(), window).unwrap();
    assert!(first.signal().is_some());

    let state = engine.state(&key()).unwrap();
    for _ in 0..3 {
        let again = engine.evaluate(&key(), window).unwrap();
        assert!(again.signal().is_none());
        assert_eq!(engine.state(&key()), Some(state));
    }
}

#[test]
fn test_incremental_engine_matches_batch() {
    let candles = scenario_candles();
    let batch = SignalEngine::new([(key(), scenario_config(false))]).unwrap();
    let cached = SignalEngine::new([(key(), scenario_config(true))]).unwrap();

    for end in 1..=candles.len() {
        let window = &candles[..end];
        let a = batch.evaluate(&key(), window).unwrap();
        let b = cached.evaluate(&key(), window).unwrap();
        assert_eq!(transition(&a), transition(&b), "tick {}", end - 1);
        assert_eq!(
            a.signal().map(|s| &s.supporting_indicators),
            b.signal().map(|s| &s.supporting_indicators)
        );
    }
}

#[test]
fn test_incremental_engine_sees_forming_candle_move() {
    let config = |incremental| EngineConfig {
        periods: IndicatorPeriods {
            ema_fast: 3,
            ema_slow: 6,
            context_emas: vec![],
            ..IndicatorPeriods::default()
        },
        policy: PolicyConfig {
            name: "ema_crossover".to_string(),
            kind: PolicyKind::CrossoverOnly,
            trigger: Trigger::EmaCross,
            companion: None,
            min_adx: None,
        },
        incremental,
        ..EngineConfig::default()
    };
    let window = |last: f64| -> Vec<Candle> {
        [20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0, 13.0, 12.0, last]
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * HOUR, c, c + 0.5, c - 0.5, c, 100.0))
            .collect()
    };

    let batch = SignalEngine::new([(key(), config(false))]).unwrap();
    let cached = SignalEngine::new([(key(), config(true))]).unwrap();

    // Same timestamps on both polls; only the newest candle's prices move
    for last in [11.0, 30.0] {
        let candles = window(last);
        let a = batch.evaluate(&key(), &candles).unwrap();
        let b = cached.evaluate(&key(), &candles).unwrap();
        assert_eq!(transition(&a), transition(&b), "last close {}", last);
        assert_eq!(a.signal().map(|s| s.side), b.signal().map(|s| s.side));
    }

    assert_eq!(batch.state(&key()).unwrap().last_emitted, Some(Direction::Bullish));
    assert_eq!(cached.state(&key()).unwrap().last_emitted, Some(Direction::Bullish));
}

#[test]
fn test_breakout_boundaries_through_engine() {
    // Closing exactly on the box high is a re-entry, not a breakout
    let mut candles = scenario_candles();
    candles.truncate(12);
    candles[11] = Candle::new(11 * HOUR, 102.5, 105.0, 102.0, 105.0, 1000.0);

    let engine = SignalEngine::new([(key(), scenario_config(false))]).unwrap();
    let results = replay(&engine, &key(), &candles);
    assert_eq!(transition(&results[10].1), Some(Transition::Armed(Direction::Bullish)));
    assert!(results[11].1.signal().is_none());
    assert_eq!(engine.state(&key()).unwrap().phase(), Phase::Armed(Direction::Bullish));
}

#[test]
fn test_keys_evaluate_concurrently() {
    let eth = SeriesKey::new("ETHUSDT", Timeframe::Hour1);
    let engine = Arc::new(
        SignalEngine::new([
            (key(), scenario_config(false)),
            (eth.clone(), scenario_config(true)),
        ])
        .unwrap(),
    );
    let candles = Arc::new(scenario_candles());

    let handles: Vec<_> = [key(), eth]
        .into_iter()
        .map(|k| {
            let engine = Arc::clone(&engine);
            let candles = Arc::clone(&candles);
            thread::spawn(move || {
                (1..=22)
                    .filter(|&end| engine.evaluate(&k, &candles[..end]).unwrap().signal().is_some())
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
