//! Trailing stop: dormant until the trade is far enough in profit, then trails
//! a fixed percentage behind the best price seen.
//!
//! For longs: stop = peak_price * (1 - trail_pct).
//! For shorts: stop = peak_price * (1 + trail_pct), where the peak is the lowest price.

use serde::{Deserialize, Serialize};

use crate::domain::Side;

use super::unrealized_return;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    /// Unrealized return at the peak that arms the stop (0.02 = 2%).
    pub activation_pct: f64,
    /// Trail distance behind the peak as a fraction (0.01 = 1%).
    pub trail_pct: f64,
}

impl Default for TrailingStop {
    fn default() -> Self {
        Self {
            activation_pct: 0.02,
            trail_pct: 0.01,
        }
    }
}

impl TrailingStop {
    pub fn is_active(&self, peak_return: f64) -> bool {
        peak_return >= self.activation_pct
    }

    /// Stop price once armed. `peak_price` is the highest price since entry
    /// for longs and the lowest for shorts.
    pub fn stop_price(&self, side: Side, entry_price: f64, peak_price: f64) -> Option<f64> {
        if !self.is_active(unrealized_return(side, entry_price, peak_price)) {
            return None;
        }
        Some(match side {
            Side::Long => peak_price * (1.0 - self.trail_pct),
            Side::Short => peak_price * (1.0 + self.trail_pct),
        })
    }

    /// Whether `price` has fallen back through the armed stop.
    pub fn should_exit(&self, side: Side, entry_price: f64, peak_price: f64, price: f64) -> bool {
        match self.stop_price(side, entry_price, peak_price) {
            Some(stop) => match side {
                Side::Long => price <= stop,
                Side::Short => price >= stop,
            },
            None => false,
        }
    }
}
