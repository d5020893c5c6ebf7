//! Rolling candle window owned by the host.
//!
//! The window is append-only: candles arrive in timestamp order with a fixed
//! spacing. Anything else is rejected before it can reach the indicator bank.

use std::collections::VecDeque;

use crate::error::EngineError;
use crate::params::ParamSet;

use super::{Candle, Timeframe};

/// Extra candles retained beyond the indicator warmup.
pub const WINDOW_MARGIN: usize = 20;

/// Check that `next` may follow `prev` in a series with the given timeframe.
pub fn check_next(
    prev: Option<&Candle>,
    next: &Candle,
    timeframe: Timeframe,
) -> Result<(), EngineError> {
    if !next.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "non-finite candle at {}",
            next.timestamp
        )));
    }
    if let Some(prev) = prev {
        if next.timestamp <= prev.timestamp {
            return Err(EngineError::InvalidInput(format!(
                "timestamp {} does not follow {}",
                next.timestamp, prev.timestamp
            )));
        }
        let gap = next.timestamp - prev.timestamp;
        if gap != timeframe.duration() {
            return Err(EngineError::InvalidInput(format!(
                "spacing between {} and {} is {} minutes, expected {}",
                prev.timestamp,
                next.timestamp,
                gap.num_minutes(),
                timeframe
            )));
        }
    }
    Ok(())
}

/// Validate a whole series: finite values, strictly increasing, fixed spacing.
pub fn validate_series(candles: &[Candle], timeframe: Timeframe) -> Result<(), EngineError> {
    let mut prev = None;
    for candle in candles {
        check_next(prev, candle, timeframe)?;
        prev = Some(candle);
    }
    Ok(())
}

/// Bounded ring buffer of the most recent candles.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    timeframe: Timeframe,
    capacity: usize,
    candles: VecDeque<Candle>,
}

impl CandleWindow {
    pub fn new(timeframe: Timeframe, capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            timeframe,
            capacity,
            candles: VecDeque::with_capacity(capacity),
        }
    }

    /// Window sized to the warmup the parameters need, plus `WINDOW_MARGIN`.
    pub fn for_params(params: &ParamSet, timeframe: Timeframe) -> Self {
        Self::new(timeframe, params.warmup() + WINDOW_MARGIN)
    }

    /// Append a candle. On error the window is left untouched.
    pub fn push(&mut self, candle: Candle) -> Result<(), EngineError> {
        check_next(self.candles.back(), &candle, self.timeframe)?;
        if self.candles.len() == self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
        Ok(())
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }
}
