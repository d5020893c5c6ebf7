//! Candle: one closed OHLCV interval of a single symbol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;

/// OHLCV candle. `timestamp` is the open time of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when every numeric field is finite (no NaN, no infinities).
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Basic OHLC sanity: high is the top of the range, low the bottom.
    pub fn is_sane(&self) -> bool {
        self.is_finite()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Midpoint of the high/low range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Time at which this candle is complete.
    pub fn close_time(&self, timeframe: Timeframe) -> DateTime<Utc> {
        self.timestamp + timeframe.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
            1_500.0,
        )
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample().is_sane());
        assert!(sample().is_bullish());
        assert!(!sample().is_bearish());
    }

    #[test]
    fn detects_non_finite() {
        let mut c = sample();
        c.close = f64::NAN;
        assert!(!c.is_finite());
        assert!(!c.is_sane());

        let mut c = sample();
        c.volume = f64::INFINITY;
        assert!(!c.is_finite());
    }

    #[test]
    fn detects_inverted_range() {
        let mut c = sample();
        c.high = 97.0;
        assert!(!c.is_sane());
    }

    #[test]
    fn close_time_adds_timeframe() {
        let c = sample();
        let tf: Timeframe = "5m".parse().unwrap();
        assert_eq!(
            c.close_time(tf),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 5, 0).unwrap()
        );
    }

    #[test]
    fn serialization_roundtrip() {
        let c = sample();
        let json = serde_json::to_string(&c).unwrap();
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
