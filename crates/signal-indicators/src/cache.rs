//! Access to the last points of EMA, RSI and ADX series.
//!
//! [`BatchTails`] recomputes every series from the window it is handed.
//! [`IndicatorCache`] keeps streaming accumulators for one series, keyed by
//! period. The accumulators only ever consume settled candles: every candle
//! of the window except the newest, which may still be forming and change
//! in place between polls. The newest candle is applied to a copy of the
//! accumulators on each call. When the settled part no longer extends what
//! the cache has consumed (a sliding window dropped its oldest candle, or a
//! settled candle was rewritten) the accumulators are rebuilt from the full
//! window, so both implementations always return identical numbers for the
//! same window.

use std::collections::HashMap;

use signal_core::traits::{CandleIndicator, Indicator, StreamingIndicator};
use signal_core::types::Candle;

use crate::momentum::{Rsi, StreamingRsi};
use crate::moving_average::{Ema, StreamingEma};
use crate::trend::{Adx, AdxOutput, StreamingAdx};

/// Source of the latest indicator points for a candle window.
pub trait SeriesTails {
    /// Last two EMA values (previous, current) over the window's closes.
    fn ema_tail(&mut self, candles: &[Candle], period: usize) -> Option<(f64, f64)>;

    /// Latest RSI over the window's closes.
    fn rsi(&mut self, candles: &[Candle], period: usize) -> Option<f64>;

    /// Latest ADX over the window.
    fn adx(&mut self, candles: &[Candle], period: usize) -> Option<AdxOutput>;
}

/// Full recomputation on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchTails;

impl SeriesTails for BatchTails {
    fn ema_tail(&mut self, candles: &[Candle], period: usize) -> Option<(f64, f64)> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        crate::last_two(&Ema::new(period).calculate(&closes))
    }

    fn rsi(&mut self, candles: &[Candle], period: usize) -> Option<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        Rsi::new(period).calculate(&closes).last().copied()
    }

    fn adx(&mut self, candles: &[Candle], period: usize) -> Option<AdxOutput> {
        Adx::new(period).calculate(candles).last().copied()
    }
}

#[derive(Debug, Clone)]
struct EmaTrack {
    ema: StreamingEma,
    prev: Option<f64>,
}

impl EmaTrack {
    fn new(period: usize) -> Self {
        Self {
            ema: StreamingEma::new(period),
            prev: None,
        }
    }

    fn update(&mut self, close: f64) {
        let before = self.ema.current();
        if self.ema.update(close).is_some() {
            self.prev = before;
        }
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.prev = None;
    }

    fn tail(&self) -> Option<(f64, f64)> {
        Some((self.prev?, self.ema.current()?))
    }
}

/// Every candle but the newest.
fn settled(candles: &[Candle]) -> &[Candle] {
    &candles[..candles.len().saturating_sub(1)]
}

/// Incremental accumulators for one series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorCache {
    origin: Option<i64>,
    consumed: usize,
    last_consumed: Option<Candle>,
    emas: HashMap<usize, EmaTrack>,
    rsis: HashMap<usize, StreamingRsi>,
    adxs: HashMap<usize, StreamingAdx>,
    rebuilds: usize,
}

impl IndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the accumulators were rebuilt from a full window.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Settled candles consumed from the current origin.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn extends_consumed(&self, settled: &[Candle]) -> bool {
        match (self.origin, settled.first()) {
            (Some(origin), Some(first)) => {
                origin == first.time
                    && self.consumed > 0
                    && self.consumed <= settled.len()
                    && settled.get(self.consumed - 1) == self.last_consumed.as_ref()
            }
            _ => false,
        }
    }

    fn sync(&mut self, candles: &[Candle]) {
        let settled = settled(candles);
        if !self.extends_consumed(settled) {
            for track in self.emas.values_mut() {
                track.reset();
            }
            for rsi in self.rsis.values_mut() {
                rsi.reset();
            }
            for adx in self.adxs.values_mut() {
                adx.reset();
            }
            self.origin = settled.first().map(|c| c.time);
            self.consumed = 0;
            self.rebuilds += 1;
        }

        for candle in &settled[self.consumed..] {
            for track in self.emas.values_mut() {
                track.update(candle.close);
            }
            for rsi in self.rsis.values_mut() {
                rsi.update(candle.close);
            }
            for adx in self.adxs.values_mut() {
                adx.update(*candle);
            }
        }

        self.consumed = settled.len();
        self.last_consumed = settled.last().copied();
    }
}

impl SeriesTails for IndicatorCache {
    fn ema_tail(&mut self, candles: &[Candle], period: usize) -> Option<(f64, f64)> {
        self.sync(candles);
        let mut live = self
            .emas
            .entry(period)
            .or_insert_with(|| {
                let mut track = EmaTrack::new(period);
                settled(candles).iter().for_each(|c| track.update(c.close));
                track
            })
            .clone();
        if let Some(newest) = candles.last() {
            live.update(newest.close);
        }
        live.tail()
    }

    fn rsi(&mut self, candles: &[Candle], period: usize) -> Option<f64> {
        self.sync(candles);
        let mut live = self
            .rsis
            .entry(period)
            .or_insert_with(|| {
                let mut rsi = StreamingRsi::new(period);
                settled(candles).iter().for_each(|c| {
                    rsi.update(c.close);
                });
                rsi
            })
            .clone();
        if let Some(newest) = candles.last() {
            live.update(newest.close);
        }
        live.current()
    }

    fn adx(&mut self, candles: &[Candle], period: usize) -> Option<AdxOutput> {
        self.sync(candles);
        let mut live = self
            .adxs
            .entry(period)
            .or_insert_with(|| {
                let mut adx = StreamingAdx::new(period);
                settled(candles).iter().for_each(|c| {
                    adx.update(*c);
                });
                adx
            })
            .clone();
        if let Some(newest) = candles.last() {
            live.update(*newest);
        }
        live.current()
    }
}
