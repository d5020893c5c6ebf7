//! Bollinger Bands.
//!
//! mid = SMA(close, period), upper/lower = mid +/- k * population stddev.
//! Width is (upper - lower) / mid. Warmup: period.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

use super::sma::Sma;
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

impl BollingerOutput {
    /// Relative band width. Zero when the mid line is zero.
    pub fn width(&self) -> f64 {
        if self.mid == 0.0 {
            0.0
        } else {
            (self.upper - self.lower) / self.mid
        }
    }

    /// Strictly inside the bands.
    pub fn contains(&self, price: f64) -> bool {
        self.lower < price && price < self.upper
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    sma: Sma,
    std_mult: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, std_mult: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            sma: Sma::new(period),
            std_mult,
            name: format!("bb_{period}_{std_mult}"),
        }
    }
}

impl Indicator for Bollinger {
    type Output = BollingerOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.sma.period()
    }

    fn next(&mut self, candle: &Candle) -> Option<BollingerOutput> {
        let mid = self.sma.update(candle.close)?;
        let band = self.std_mult * self.sma.population_std(mid);
        Some(BollingerOutput {
            upper: mid + band,
            mid,
            lower: mid - band,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_candles, DEFAULT_EPSILON};

    #[test]
    fn bollinger_known_values() {
        // window [2, 4, 4, 6]: mean 4, population std sqrt(2)
        let candles = make_candles(&[2.0, 4.0, 4.0, 6.0]);
        let result = compute_series(&mut Bollinger::new(4, 2.0), &candles);
        assert!(result[..3].iter().all(|v| v.is_none()));
        let out = result[3].unwrap();
        let sd = 2.0_f64.sqrt();
        assert_approx(out.mid, 4.0, DEFAULT_EPSILON);
        assert_approx(out.upper, 4.0 + 2.0 * sd, DEFAULT_EPSILON);
        assert_approx(out.lower, 4.0 - 2.0 * sd, DEFAULT_EPSILON);
        assert_approx(out.width(), 4.0 * sd / 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_constant_series_collapses() {
        let candles = make_candles(&[100.0; 5]);
        let result = compute_series(&mut Bollinger::new(3, 2.0), &candles);
        let out = result[4].unwrap();
        assert_approx(out.upper, out.lower, DEFAULT_EPSILON);
        assert_approx(out.width(), 0.0, DEFAULT_EPSILON);
        // zero-width bands contain nothing
        assert!(!out.contains(100.0));
    }

    #[test]
    fn bollinger_bands_ordered() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.5).cos() * 3.0).collect();
        let candles = make_candles(&closes);
        for out in compute_series(&mut Bollinger::new(20, 2.0), &candles).iter().flatten() {
            assert!(out.lower <= out.mid && out.mid <= out.upper);
        }
    }
}
