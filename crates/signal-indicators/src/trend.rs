//! Trend strength indicators.
//!
//! ADX follows Wilder: +DM, -DM and true range come from consecutive
//! candles, are Wilder-averaged over `period`, turned into +DI / -DI and DX,
//! and DX is Wilder-averaged again. The first value needs `2 * period`
//! candles.

use serde::{Deserialize, Serialize};
use signal_core::traits::{CandleIndicator, StreamingIndicator};
use signal_core::types::Candle;

use crate::momentum::Rsi;

/// ADX output with its directional components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// True range, +DM and -DM of `curr` against `prev`.
fn directional_move(prev: &Candle, curr: &Candle) -> (f64, f64, f64) {
    let up = curr.high - prev.high;
    let down = prev.low - curr.low;
    let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
    let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
    (curr.true_range(Some(prev.close)), plus_dm, minus_dm)
}

/// +DI, -DI and DX from smoothed true range and directional movement.
fn directional_index(tr: f64, plus_dm: f64, minus_dm: f64) -> (f64, f64, f64) {
    if tr == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let plus_di = 100.0 * plus_dm / tr;
    let minus_di = 100.0 * minus_dm / tr;
    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    };
    (plus_di, minus_di, dx)
}

/// Average Directional Index.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Create a new ADX. The conventional period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl CandleIndicator for Adx {
    type Output = AdxOutput;

    fn calculate(&self, candles: &[Candle]) -> Vec<AdxOutput> {
        if candles.len() < self.period() {
            return vec![];
        }

        let n = candles.len() - 1;
        let mut tr = Vec::with_capacity(n);
        let mut plus_dm = Vec::with_capacity(n);
        let mut minus_dm = Vec::with_capacity(n);

        for pair in candles.windows(2) {
            let (t, p, m) = directional_move(&pair[0], &pair[1]);
            tr.push(t);
            plus_dm.push(p);
            minus_dm.push(m);
        }

        let smooth_tr = Rsi::wilder_smooth(&tr, self.period);
        let smooth_plus = Rsi::wilder_smooth(&plus_dm, self.period);
        let smooth_minus = Rsi::wilder_smooth(&minus_dm, self.period);

        let indices: Vec<(f64, f64, f64)> = smooth_tr
            .iter()
            .zip(smooth_plus.iter())
            .zip(smooth_minus.iter())
            .map(|((&t, &p), &m)| directional_index(t, p, m))
            .collect();
        let dx: Vec<f64> = indices.iter().map(|&(_, _, dx)| dx).collect();

        let adx = Rsi::wilder_smooth(&dx, self.period);

        // Align DI values with the ADX points
        let offset = self.period - 1;
        adx.iter()
            .zip(indices[offset..].iter())
            .map(|(&adx, &(plus_di, minus_di, _))| AdxOutput {
                adx,
                plus_di,
                minus_di,
            })
            .collect()
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

/// Streaming ADX fed one candle at a time.
#[derive(Debug, Clone)]
pub struct StreamingAdx {
    period: usize,
    prev: Option<Candle>,
    moves: usize,
    sums: (f64, f64, f64),
    smoothed: Option<(f64, f64, f64)>,
    dx_count: usize,
    dx_sum: f64,
    adx: Option<f64>,
    last_di: (f64, f64),
}

impl StreamingAdx {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            prev: None,
            moves: 0,
            sums: (0.0, 0.0, 0.0),
            smoothed: None,
            dx_count: 0,
            dx_sum: 0.0,
            adx: None,
            last_di: (0.0, 0.0),
        }
    }
}

impl StreamingIndicator for StreamingAdx {
    type Input = Candle;
    type Output = AdxOutput;

    fn update(&mut self, candle: Candle) -> Option<AdxOutput> {
        let prev = self.prev.replace(candle)?;
        let (tr, plus_dm, minus_dm) = directional_move(&prev, &candle);
        self.moves += 1;
        let period_f64 = self.period as f64;

        let (s_tr, s_plus, s_minus) = match self.smoothed {
            Some((t, p, m)) => (
                (t * (period_f64 - 1.0) + tr) / period_f64,
                (p * (period_f64 - 1.0) + plus_dm) / period_f64,
                (m * (period_f64 - 1.0) + minus_dm) / period_f64,
            ),
            None => {
                self.sums.0 += tr;
                self.sums.1 += plus_dm;
                self.sums.2 += minus_dm;
                if self.moves < self.period {
                    return None;
                }
                (
                    self.sums.0 / period_f64,
                    self.sums.1 / period_f64,
                    self.sums.2 / period_f64,
                )
            }
        };
        self.smoothed = Some((s_tr, s_plus, s_minus));

        let (plus_di, minus_di, dx) = directional_index(s_tr, s_plus, s_minus);
        self.last_di = (plus_di, minus_di);

        match self.adx {
            Some(adx) => self.adx = Some((adx * (period_f64 - 1.0) + dx) / period_f64),
            None => {
                self.dx_sum += dx;
                self.dx_count += 1;
                if self.dx_count == self.period {
                    self.adx = Some(self.dx_sum / period_f64);
                }
            }
        }

        self.current()
    }

    fn current(&self) -> Option<AdxOutput> {
        self.adx.map(|adx| AdxOutput {
            adx,
            plus_di: self.last_di.0,
            minus_di: self.last_di.1,
        })
    }

    fn reset(&mut self) {
        *self = Self::new(self.period);
    }

    fn is_ready(&self) -> bool {
        self.adx.is_some()
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}
