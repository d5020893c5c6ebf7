//! Relative Strength Index (RSI), Wilder smoothing.
//!
//! change[t] = close[t] - close[t-1]
//! avg_gain / avg_loss: Wilder averages of the positive / negative parts,
//! seeded by the simple mean of the first `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! Zero average loss reads 100, flat windows included. Warmup: period + 1.

use crate::domain::Candle;

use super::atr::Wilder;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    gain: Wilder,
    loss: Wilder,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            gain: Wilder::new(period),
            loss: Wilder::new(period),
            name: format!("rsi_{period}"),
        }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

impl Indicator for Rsi {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period + 1
    }

    fn next(&mut self, candle: &Candle) -> Option<f64> {
        let prev = self.prev_close.replace(candle.close)?;
        let change = candle.close - prev;
        let (up, down) = if change.is_finite() {
            (change.max(0.0), (-change).max(0.0))
        } else {
            (f64::NAN, f64::NAN)
        };
        let avg_gain = self.gain.update(up);
        let avg_loss = self.loss.update(down);
        Some(rsi_from_averages(avg_gain?, avg_loss?))
    }
}
