//! Simple Moving Average (SMA) over a rolling window.
//!
//! The window keeps the last `period` values so Bollinger Bands can take the
//! standard deviation of the same samples. Warmup: period.

use std::collections::VecDeque;

use crate::domain::Candle;

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    tainted: bool,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            tainted: false,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed the next value; returns the mean once the window is full.
    pub fn update(&mut self, x: f64) -> Option<f64> {
        if self.tainted {
            return None;
        }
        if !x.is_finite() {
            self.tainted = true;
            self.window.clear();
            return None;
        }

        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(x);
        self.mean()
    }

    /// Mean of the current window, if full.
    pub fn mean(&self) -> Option<f64> {
        (self.window.len() == self.period)
            .then(|| self.window.iter().sum::<f64>() / self.period as f64)
    }

    /// Population standard deviation of the current window around `mean`.
    pub fn population_std(&self, mean: f64) -> f64 {
        let variance = self
            .window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.window.len().max(1) as f64;
        variance.sqrt()
    }
}

impl Indicator for Sma {
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
