//! Average True Range (ATR) and Wilder smoothing.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|). The first
//! candle has no previous close and therefore no true range. Any non-finite
//! input gives a NaN true range, which taints the smoother.
//! ATR is Wilder-smoothed true range (alpha = 1/period, seeded by the mean of
//! the first `period` values). Warmup: period + 1.

use crate::domain::Candle;

use super::ema::Ema;
use super::Indicator;

/// True range of a candle given the previous close. NaN unless every input
/// is finite (`f64::max` would otherwise drop the NaN operand).
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    if !(high.is_finite() && low.is_finite() && prev_close.is_finite()) {
        return f64::NAN;
    }
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Wilder smoothing: an EMA with alpha = 1/period.
#[derive(Debug, Clone)]
pub struct Wilder(Ema);

impl Wilder {
    pub fn new(period: usize) -> Self {
        Self(Ema::with_alpha(
            period,
            1.0 / period.max(1) as f64,
            format!("wilder_{period}"),
        ))
    }

    pub fn update(&mut self, x: f64) -> Option<f64> {
        self.0.update(x)
    }

    pub fn value(&self) -> Option<f64> {
        self.0.value()
    }

    pub fn period(&self) -> usize {
        self.0.period()
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    smoother: Wilder,
    prev_close: Option<f64>,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            smoother: Wilder::new(period),
            prev_close: None,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.smoother.period() + 1
    }

    fn next(&mut self, candle: &Candle) -> Option<f64> {
        // A bad first candle has no true range of its own, so it poisons the
        // stored close instead.
        let finite = candle.high.is_finite() && candle.low.is_finite() && candle.close.is_finite();
        let close = if finite { candle.close } else { f64::NAN };
        let prev_close = self.prev_close.replace(close)?;
        let tr = if finite {
            true_range(candle.high, candle.low, prev_close)
        } else {
            f64::NAN
        };
        self.smoother.update(tr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_ohlc, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        assert_approx(true_range(108.0, 100.0, 102.0), 8.0, DEFAULT_EPSILON);
        assert_approx(true_range(107.0, 98.0, 106.0), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // prev close 100, bar 108..115 -> |115-100| = 15 dominates
        assert_approx(true_range(115.0, 108.0, 100.0), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_nan_propagates() {
        assert!(true_range(f64::NAN, 100.0, 100.0).is_nan());
        assert!(true_range(105.0, f64::NAN, 100.0).is_nan());
        assert!(true_range(105.0, 95.0, f64::NAN).is_nan());
        assert!(true_range(f64::INFINITY, 95.0, 100.0).is_nan());
    }

    #[test]
    fn atr_period_3() {
        let candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),  // no TR
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = compute_series(&mut Atr::new(3), &candles);

        assert!(result[..3].iter().all(|v| v.is_none()));
        // seed: mean(8, 9, 6) = 23/3; next: (1/3)*6 + (2/3)*(23/3) = 64/9
        assert_approx(result[3].unwrap(), 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 64.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_nan_high_taints() {
        let mut candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
        ]);
        candles[1].high = f64::NAN;
        let result = compute_series(&mut Atr::new(2), &candles);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn atr_nan_low_after_warmup_taints() {
        let mut candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 111.0),
        ]);
        candles[4].low = f64::NAN;
        let result = compute_series(&mut Atr::new(3), &candles);
        assert!(result[3].is_some());
        assert!(result[4..].iter().all(|v| v.is_none()));
    }

    #[test]
    fn atr_bad_first_candle_taints() {
        let mut candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
        ]);
        candles[0].high = f64::NAN;
        let result = compute_series(&mut Atr::new(2), &candles);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn atr_warmup() {
        assert_eq!(Atr::new(14).warmup(), 15);
    }

    #[test]
    fn wilder_uses_one_over_period() {
        let mut w = Wilder::new(4);
        for v in [4.0, 4.0, 4.0, 4.0] {
            w.update(v);
        }
        assert_approx(w.value().unwrap(), 4.0, DEFAULT_EPSILON);
        // 0.25 * 8 + 0.75 * 4 = 5
        assert_approx(w.update(8.0).unwrap(), 5.0, DEFAULT_EPSILON);
    }
}
