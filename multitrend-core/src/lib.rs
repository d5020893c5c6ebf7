//! MultiTrend Core: confluence signal engine over a single OHLCV series.
//!
//! Six indicators feed one score, and the score drives the trade decisions:
//! - Domain types (candles, timeframes, the rolling candle window)
//! - Streaming indicator bank (EMA, ADX, Supertrend, MACD, RSI, Bollinger, volume SMA)
//! - Confluence scorer (four directional votes, two gates)
//! - Signal generator (entry gates, edge-triggered exits)
//! - Risk derivation (strength-scaled stop, trailing stop, ROI ladder)
//! - Parameter set with bounds and optimizer search space
//!
//! Pure computation: no I/O, no clocks, no shared state between engines.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod params;
pub mod risk;
pub mod scoring;
pub mod signals;

pub use domain::{Candle, CandleWindow, Side, Timeframe};
pub use engine::{evaluate_window, Evaluation, SignalEngine};
pub use error::{EngineError, ParamViolation};
pub use params::ParamSet;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engines and their outputs can cross threads.
    ///
    /// The runner scans symbols in parallel, one engine per worker.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::CandleWindow>();
        require_sync::<domain::CandleWindow>();
        require_send::<params::ParamSet>();
        require_sync::<params::ParamSet>();

        require_send::<indicators::IndicatorBank>();
        require_sync::<indicators::IndicatorBank>();
        require_send::<indicators::IndicatorSnapshot>();
        require_sync::<indicators::IndicatorSnapshot>();

        require_send::<scoring::ConfluenceResult>();
        require_sync::<scoring::ConfluenceResult>();
        require_send::<signals::SignalDecision>();
        require_sync::<signals::SignalDecision>();
        require_send::<risk::RiskParameters>();
        require_sync::<risk::RiskParameters>();

        require_send::<engine::SignalEngine>();
        require_sync::<engine::SignalEngine>();
        require_send::<engine::Evaluation>();
        require_sync::<engine::Evaluation>();
        require_send::<error::EngineError>();
        require_sync::<error::EngineError>();
    }
}
