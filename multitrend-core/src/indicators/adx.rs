//! ADX: Average Directional Index (Wilder).
//!
//! Steps per candle (after the first):
//! 1. up = high - prev_high, down = prev_low - low
//!    +DM = up if up > down and up > 0, else 0; -DM mirrored
//! 2. Wilder-smooth TR, +DM and -DM over `period`
//! 3. +DI = 100 * s(+DM) / s(TR), -DI = 100 * s(-DM) / s(TR)
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! A zero true range (no movement at all) gives DI = DX = 0.
//! Warmup: 2 * period (period for the DI smoothing, then period for ADX).

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

use super::atr::{true_range, Wilder};
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    prev: Option<(f64, f64, f64)>,
    tr: Wilder,
    plus_dm: Wilder,
    minus_dm: Wilder,
    dx: Wilder,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            prev: None,
            tr: Wilder::new(period),
            plus_dm: Wilder::new(period),
            minus_dm: Wilder::new(period),
            dx: Wilder::new(period),
            name: format!("adx_{period}"),
        }
    }
}

/// +DM and -DM for one step. NaN in, NaN out, so the smoothers taint.
fn directional_movement(high: f64, low: f64, prev_high: f64, prev_low: f64) -> (f64, f64) {
    let up = high - prev_high;
    let down = prev_low - low;
    if !up.is_finite() || !down.is_finite() {
        return (f64::NAN, f64::NAN);
    }
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

impl Indicator for Adx {
    type Output = AdxOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        2 * self.period
    }

    fn next(&mut self, candle: &Candle) -> Option<AdxOutput> {
        let (prev_high, prev_low, prev_close) =
            self.prev.replace((candle.high, candle.low, candle.close))?;

        let (plus, minus) = directional_movement(candle.high, candle.low, prev_high, prev_low);
        let tr = true_range(candle.high, candle.low, prev_close);

        // All three smoothers advance together, even while one is still seeding.
        let s_tr = self.tr.update(tr);
        let s_plus = self.plus_dm.update(plus);
        let s_minus = self.minus_dm.update(minus);
        let (s_tr, s_plus, s_minus) = (s_tr?, s_plus?, s_minus?);

        let (di_plus, di_minus) = if s_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        };
        let di_sum = di_plus + di_minus;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (di_plus - di_minus).abs() / di_sum
        };

        let adx = self.dx.update(dx)?;
        Some(AdxOutput {
            adx,
            di_plus,
            di_minus,
        })
    }
}
