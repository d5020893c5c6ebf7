//! Supertrend: ATR-based directional indicator.
//!
//! Inherently sequential: direction flips between support and resistance
//! based on close vs band comparisons, so the state persists across candles.
//!
//! Bands around hl2 = (high + low) / 2:
//!   basic_upper = hl2 + multiplier * ATR, basic_lower = hl2 - multiplier * ATR
//! The final upper band only tightens while the previous close stayed at or
//! below it; the final lower band only rises while the previous close stayed
//! at or above it. Starts trending up.
//!
//! Warmup: period + 1 (same as ATR).

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

use super::atr::Atr;
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupertrendOutput {
    /// Active band: lower band (support) when up, upper band (resistance) when down.
    pub value: f64,
    pub direction: TrendDirection,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
struct Bands {
    upper: f64,
    lower: f64,
    direction: TrendDirection,
    close: f64,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    multiplier: f64,
    atr: Atr,
    state: Option<Bands>,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        Self {
            multiplier,
            atr: Atr::new(period),
            state: None,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Supertrend {
    type Output = SupertrendOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.atr.warmup()
    }

    fn next(&mut self, candle: &Candle) -> Option<SupertrendOutput> {
        let atr = self.atr.next(candle)?;

        let hl2 = candle.hl2();
        let basic_upper = hl2 + self.multiplier * atr;
        let basic_lower = hl2 - self.multiplier * atr;

        let bands = match self.state.take() {
            None => Bands {
                upper: basic_upper,
                lower: basic_lower,
                direction: TrendDirection::Up,
                close: candle.close,
            },
            Some(prev) => {
                let upper = if prev.close <= prev.upper {
                    basic_upper.min(prev.upper)
                } else {
                    basic_upper
                };
                let lower = if prev.close >= prev.lower {
                    basic_lower.max(prev.lower)
                } else {
                    basic_lower
                };
                let direction = match prev.direction {
                    TrendDirection::Up if candle.close < lower => TrendDirection::Down,
                    TrendDirection::Down if candle.close > upper => TrendDirection::Up,
                    unchanged => unchanged,
                };
                Bands {
                    upper,
                    lower,
                    direction,
                    close: candle.close,
                }
            }
        };

        let out = SupertrendOutput {
            value: match bands.direction {
                TrendDirection::Up => bands.lower,
                TrendDirection::Down => bands.upper,
            },
            direction: bands.direction,
            upper: bands.upper,
            lower: bands.lower,
        };
        self.state = Some(bands);
        Some(out)
    }
}
