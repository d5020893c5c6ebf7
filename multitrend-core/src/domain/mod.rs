//! Domain types: candles, timeframes, the host-owned rolling window, trade sides.

pub mod candle;
pub mod timeframe;
pub mod window;

pub use candle::Candle;
pub use timeframe::Timeframe;
pub use window::{check_next, validate_series, CandleWindow, WINDOW_MARGIN};

use serde::{Deserialize, Serialize};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}
