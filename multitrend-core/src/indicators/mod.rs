//! Streaming indicator implementations and the bank that owns them.
//!
//! Every indicator is a small state machine fed one candle at a time. Values
//! for a closed candle are produced exactly once and never revisited, so the
//! recursive indicators (EMA, Wilder averages, Supertrend) see their inputs in
//! order. Until an indicator has seen `warmup()` candles it yields `None`.
//!
//! Non-finite input taints an indicator for good: it yields `None` from that
//! point on rather than inventing a value.

pub mod adx;
pub mod atr;
pub mod bank;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod supertrend;

pub use adx::{Adx, AdxOutput};
pub use atr::{true_range, Atr, Wilder};
pub use bank::{IndicatorBank, IndicatorSnapshot, VOLUME_SMA_PERIOD};
pub use bollinger::{Bollinger, BollingerOutput};
pub use ema::Ema;
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;
pub use supertrend::{Supertrend, SupertrendOutput, TrendDirection};

use crate::domain::Candle;

/// A streaming indicator over candles.
pub trait Indicator: Send + Sync {
    type Output: Copy;

    /// Human-readable name (e.g., "ema_12", "adx_14").
    fn name(&self) -> &str;

    /// Number of candles needed before the first output.
    fn warmup(&self) -> usize;

    /// Feed the next closed candle.
    fn next(&mut self, candle: &Candle) -> Option<Self::Output>;
}

/// Run an indicator over a whole series, one output slot per candle.
pub fn compute_series<I: Indicator>(indicator: &mut I, candles: &[Candle]) -> Vec<Option<I::Output>> {
    candles.iter().map(|c| indicator.next(c)).collect()
}

/// Create synthetic candles from close prices for testing.
///
/// open = previous close (or close for the first candle),
/// high = max(open, close) + 1, low = min(open, close) - 1, volume = 1000,
/// spaced five minutes apart.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                base + chrono::Duration::minutes(5 * i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// Create candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::new(
                base + chrono::Duration::minutes(5 * i as i64),
                open,
                high,
                low,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
