//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Warmup: period.

use crate::domain::Candle;

use super::Indicator;

/// Streaming EMA. Also the engine behind Wilder smoothing (see `atr::Wilder`).
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
    tainted: bool,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::with_alpha(period, 2.0 / (period as f64 + 1.0), format!("ema_{period}"))
    }

    pub(crate) fn with_alpha(period: usize, alpha: f64, name: String) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha,
            seed_sum: 0.0,
            seen: 0,
            value: None,
            tainted: false,
            name,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Latest value, if the seed window has been filled.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Feed the next value of the underlying series.
    pub fn update(&mut self, x: f64) -> Option<f64> {
        if self.tainted {
            return None;
        }
        if !x.is_finite() {
            self.tainted = true;
            self.value = None;
            return None;
        }

        self.value = match self.value {
            Some(prev) => Some(self.alpha * x + (1.0 - self.alpha) * prev),
            None => {
                self.seed_sum += x;
                self.seen += 1;
                (self.seen == self.period).then(|| self.seed_sum / self.period as f64)
            }
        };
        self.value
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn next(&mut self, candle: &Candle) -> Option<f64> {
        self.update(candle.close)
    }
}

/// EMA over an arbitrary pre-extracted series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut ema = Ema::new(period);
    values.iter().map(|&v| ema.update(v)).collect()
}
