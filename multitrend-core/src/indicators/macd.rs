//! MACD: Moving Average Convergence/Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow), defined once both EMAs are
//! signal = EMA(line, signal), seeded by the SMA of the first `signal` lines
//! hist = line - signal
//!
//! Warmup: max(fast, slow) + signal - 1.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

use super::ema::Ema;
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub line: f64,
    pub signal: f64,
    pub hist: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.fast.period().max(self.slow.period()) + self.signal.period() - 1
    }

    fn next(&mut self, candle: &Candle) -> Option<MacdOutput> {
        let fast = self.fast.update(candle.close);
        let slow = self.slow.update(candle.close);
        let line = fast? - slow?;
        let signal = self.signal.update(line)?;
        Some(MacdOutput {
            line,
            signal,
            hist: line - signal,
        })
    }
}
