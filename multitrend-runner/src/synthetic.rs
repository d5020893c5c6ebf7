//! Synthetic candles for development and demos.
//!
//! A seeded random walk with slowly switching drift regimes, so the series
//! carries trends long enough for the confluence engine to react. Seeded from
//! the symbol name: the same symbol always produces the same series. These
//! candles are clearly fake and reports built on them are tagged synthetic.

use chrono::{DateTime, Utc};
use multitrend_core::{Candle, Timeframe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Candles between drift regime changes, on average.
const MEAN_REGIME_LEN: f64 = 150.0;

pub fn generate_synthetic_candles(
    symbol: &str,
    start: DateTime<Utc>,
    count: usize,
    timeframe: Timeframe,
) -> Vec<Candle> {
    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut candles = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let mut drift = 0.0_f64;

    for i in 0..count {
        if rng.gen_bool(1.0 / MEAN_REGIME_LEN) || i == 0 {
            drift = rng.gen_range(-0.002..0.002);
        }

        let step: f64 = drift + rng.gen_range(-0.004..0.004);
        let open = price;
        let close = (price * (1.0 + step)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.002));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.002));
        let volume = rng.gen_range(500.0..1_500.0) * (1.0 + step.abs() * 200.0);

        candles.push(Candle::new(
            start + timeframe.duration() * i as i32,
            open,
            high,
            low,
            close,
            volume,
        ));
        price = close;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use multitrend_core::domain::validate_series;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let tf = Timeframe::default();
        let a = generate_synthetic_candles("BTC/USDT", start(), 300, tf);
        let b = generate_synthetic_candles("BTC/USDT", start(), 300, tf);
        let c = generate_synthetic_candles("ETH/USDT", start(), 300, tf);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn series_is_valid() {
        let tf: Timeframe = "1h".parse().unwrap();
        let candles = generate_synthetic_candles("SOL/USDT", start(), 500, tf);
        assert_eq!(candles.len(), 500);
        validate_series(&candles, tf).unwrap();
        for c in &candles {
            assert!(c.is_sane(), "inconsistent candle {c:?}");
        }
    }
}
