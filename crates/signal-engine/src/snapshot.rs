//! Indicator points needed for one decision.

use std::collections::BTreeMap;
use std::fmt;

use signal_core::traits::{Indicator, MultiOutputIndicator};
use signal_core::types::{check_candles, closes, volumes, Candle, RangeBox, SeriesDefect};
use signal_indicators::{last_two, range_box, BollingerBands, Macd, SeriesTails, Sma};

use crate::config::{EngineConfig, IndicatorPeriods};
use crate::policy::Trigger;

/// Why a window produced no decision. Skips never touch the key's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer candles than the decision indicators need.
    InsufficientData { required: usize, available: usize },
    /// The window breaks the ordering or finiteness contract.
    MalformedSeries(SeriesDefect),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientData {
                required,
                available,
            } => write!(f, "insufficient data: need {} candles, have {}", required, available),
            SkipReason::MalformedSeries(defect) => write!(f, "malformed series: {}", defect),
        }
    }
}

/// Last two points of a line and of the reference it crosses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePair {
    /// (previous, current)
    pub line: (f64, f64),
    /// (previous, current)
    pub reference: (f64, f64),
}

/// Decision inputs computed from one candle window.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    /// Time of the evaluated candle
    pub time: i64,
    /// Close of the evaluated candle
    pub close: f64,
    pub trigger: LinePair,
    pub companion: Option<LinePair>,
    /// ADX of the window, when enough candles exist
    pub adx: Option<f64>,
    /// Range box before the evaluated candle (may be invalid)
    pub range: Option<RangeBox>,
    /// Values reported on an emitted signal
    pub supporting: BTreeMap<String, f64>,
}

impl IndicatorSnapshot {
    /// Compute the snapshot, or the reason the window cannot be decided on.
    pub fn compute(
        candles: &[Candle],
        config: &EngineConfig,
        tails: &mut dyn SeriesTails,
    ) -> Result<Self, SkipReason> {
        check_candles(candles).map_err(SkipReason::MalformedSeries)?;

        let required = config.min_candles();
        let insufficient = || SkipReason::InsufficientData {
            required,
            available: candles.len(),
        };
        let last = match candles.last() {
            Some(c) if candles.len() >= required => *c,
            _ => return Err(insufficient()),
        };

        let periods = &config.periods;
        let prices = closes(candles);
        let mut supporting = BTreeMap::new();

        let trigger = line_pair(config.policy.trigger, candles, &prices, periods, tails, &mut supporting)
            .ok_or_else(insufficient)?;
        let companion = match config.policy.companion {
            Some(t) => Some(
                line_pair(t, candles, &prices, periods, tails, &mut supporting)
                    .ok_or_else(insufficient)?,
            ),
            None => None,
        };

        let adx = tails.adx(candles, periods.adx);
        if config.policy.min_adx.is_some() && adx.is_none() {
            return Err(insufficient());
        }
        if let Some(point) = adx {
            supporting.insert("adx".to_string(), point.adx);
            supporting.insert("plus_di".to_string(), point.plus_di);
            supporting.insert("minus_di".to_string(), point.minus_di);
        }

        let range = range_box(candles, periods.box_lookback);
        if config.policy.kind.uses_range() && range.is_none() {
            return Err(insufficient());
        }
        if let Some(b) = range.filter(RangeBox::is_valid) {
            supporting.insert("box_high".to_string(), b.high);
            supporting.insert("box_low".to_string(), b.low);
            supporting.insert("box_size".to_string(), b.size);
        }

        let mut ema_periods = vec![periods.ema_fast, periods.ema_slow];
        ema_periods.extend(periods.context_emas.iter().copied());
        for period in ema_periods {
            if let Some((_, value)) = tails.ema_tail(candles, period) {
                supporting.insert(format!("ema_{}", period), value);
            }
        }

        if let Some(rsi) = tails.rsi(candles, periods.rsi) {
            supporting.insert("rsi".to_string(), rsi);
        }

        let volume_avg = Sma::new(periods.volume_period).calculate(&volumes(candles));
        if let Some(&avg) = volume_avg.last() {
            if avg > 0.0 {
                supporting.insert("volume_ratio".to_string(), last.volume / avg);
            }
        }

        Ok(Self {
            time: last.time,
            close: last.close,
            trigger,
            companion,
            adx: adx.map(|p| p.adx),
            range,
            supporting,
        })
    }

    /// The range box, if it may drive a decision.
    pub fn valid_range(&self) -> Option<&RangeBox> {
        self.range.as_ref().filter(|b| b.is_valid())
    }
}

fn line_pair(
    trigger: Trigger,
    candles: &[Candle],
    prices: &[f64],
    periods: &IndicatorPeriods,
    tails: &mut dyn SeriesTails,
    supporting: &mut BTreeMap<String, f64>,
) -> Option<LinePair> {
    match trigger {
        Trigger::Macd => {
            let macd = Macd::with_periods(periods.macd_fast, periods.macd_slow, periods.macd_signal);
            let (prev, curr) = last_two(&macd.calculate(prices))?;
            supporting.insert("macd".to_string(), curr.macd);
            supporting.insert("macd_signal".to_string(), curr.signal);
            supporting.insert("macd_histogram".to_string(), curr.histogram);
            Some(LinePair {
                line: (prev.macd, curr.macd),
                reference: (prev.signal, curr.signal),
            })
        }
        Trigger::EmaCross => Some(LinePair {
            line: tails.ema_tail(candles, periods.ema_fast)?,
            reference: tails.ema_tail(candles, periods.ema_slow)?,
        }),
        Trigger::EmaBollinger => {
            let line = tails.ema_tail(candles, periods.ema_fast)?;
            let bands = BollingerBands::with_params(periods.bollinger_period, periods.bollinger_multiplier);
            let (prev, curr) = last_two(&bands.calculate(prices))?;
            supporting.insert("bb_upper".to_string(), curr.upper);
            supporting.insert("bb_middle".to_string(), curr.middle);
            supporting.insert("bb_lower".to_string(), curr.lower);
            Some(LinePair {
                line,
                reference: (prev.middle, curr.middle),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyKind;
    use signal_indicators::{BatchTails, IndicatorCache};

    fn wave(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.25).sin() * 4.0;
                Candle::new(i as i64 * 3_600_000, base, base + 0.6, base - 0.6, base + 0.1, 1000.0 + i as f64)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_window_is_skipped() {
        let config = EngineConfig::default();
        let candles = wave(config.min_candles() - 1);
        let result = IndicatorSnapshot::compute(&candles, &config, &mut BatchTails);
        assert_eq!(
            result,
            Err(SkipReason::InsufficientData {
                required: 35,
                available: 34
            })
        );
        assert!(IndicatorSnapshot::compute(&[], &config, &mut BatchTails).is_err());
    }

    #[test]
    fn test_malformed_window_is_skipped() {
        let config = EngineConfig::default();
        let mut candles = wave(60);
        candles.swap(10, 11);
        let result = IndicatorSnapshot::compute(&candles, &config, &mut BatchTails);
        assert_eq!(
            result,
            Err(SkipReason::MalformedSeries(SeriesDefect::OutOfOrder { index: 11 }))
        );
    }

    #[test]
    fn test_context_values_only_when_available() {
        let config = EngineConfig::default();
        let short = IndicatorSnapshot::compute(&wave(60), &config, &mut BatchTails).unwrap();
        assert!(short.supporting.contains_key("macd"));
        assert!(short.supporting.contains_key("ema_50"));
        assert!(!short.supporting.contains_key("ema_200"));
        assert!(short.supporting.contains_key("rsi"));
        assert!(short.supporting.contains_key("box_size"));
        assert!(short.supporting.contains_key("volume_ratio"));

        let long = IndicatorSnapshot::compute(&wave(260), &config, &mut BatchTails).unwrap();
        assert!(long.supporting.contains_key("ema_200"));
        assert!(long.supporting.contains_key("adx"));
    }

    #[test]
    fn test_crossover_only_does_not_need_box() {
        let mut config = EngineConfig::default();
        config.policy.kind = PolicyKind::CrossoverOnly;
        config.policy.trigger = Trigger::EmaCross;
        config.periods.box_lookback = 100;

        let snapshot = IndicatorSnapshot::compute(&wave(40), &config, &mut BatchTails).unwrap();
        assert!(snapshot.range.is_none());
        assert!(snapshot.valid_range().is_none());
    }

    #[test]
    fn test_cached_snapshot_matches_batch() {
        let mut config = EngineConfig::default();
        config.policy.trigger = Trigger::EmaBollinger;
        config.policy.companion = Some(Trigger::EmaCross);
        config.policy.min_adx = Some(20.0);

        let candles = wave(150);
        let mut cache = IndicatorCache::new();
        for end in config.min_candles()..=candles.len() {
            let window = &candles[..end];
            let batch = IndicatorSnapshot::compute(window, &config, &mut BatchTails);
            let cached = IndicatorSnapshot::compute(window, &config, &mut cache);
            assert_eq!(batch, cached);
        }
    }
}
