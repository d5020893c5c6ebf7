//! Signal generator: entry gates and exit triggers for one closed candle.
//!
//! Pure function of the scored confluence, the candle and its snapshot. The
//! previous snapshot only enters through `ConfluenceResult::crosses`, which is
//! how the edge-triggered exits (EMA cross, Supertrend flip, MACD histogram
//! sign change) fire once on the transition candle and not after.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Side};
use crate::indicators::IndicatorSnapshot;
use crate::params::ParamSet;
use crate::scoring::{ConfluenceResult, Cross, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Fast EMA crossed the slow EMA against the position.
    EmaCross,
    /// Supertrend flipped against the position.
    SupertrendFlip,
    /// MACD histogram changed sign against the position.
    MacdCross,
    /// RSI beyond the overbought (long) or oversold (short) level.
    RsiExtreme,
    /// Close on the wrong side of the trend EMA.
    TrendBreak,
}

/// Entry and exit flags for one candle. Entry and exit are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub enter_long: bool,
    pub enter_short: bool,
    pub exit_long: bool,
    pub exit_short: bool,
    pub long_exit_reasons: Vec<ExitReason>,
    pub short_exit_reasons: Vec<ExitReason>,
}

impl SignalDecision {
    /// The side to enter, if exactly one entry flag is set.
    pub fn entry_side(&self) -> Option<Side> {
        match (self.enter_long, self.enter_short) {
            (true, false) => Some(Side::Long),
            (false, true) => Some(Side::Short),
            _ => None,
        }
    }

    /// Any entry or exit flag set.
    pub fn has_signal(&self) -> bool {
        self.enter_long || self.enter_short || self.exit_long || self.exit_short
    }
}

fn entry_allowed(
    side: Side,
    confluence: &ConfluenceResult,
    candle: &Candle,
    snapshot: &IndicatorSnapshot,
    params: &ParamSet,
) -> bool {
    let (direction, candle_agrees, trend_agrees, macd_agrees) = match side {
        Side::Long => (
            Direction::Long,
            candle.is_bullish(),
            candle.close > snapshot.ema_trend,
            snapshot.macd_hist > 0.0,
        ),
        Side::Short => (
            Direction::Short,
            candle.is_bearish(),
            candle.close < snapshot.ema_trend,
            snapshot.macd_hist < 0.0,
        ),
    };

    confluence.direction == direction
        && confluence.strength >= params.min_trend_confirmations
        && confluence.rsi_neutral()
        && candle_agrees
        && candle.volume > snapshot.volume_sma
        && confluence.inside_bands()
        && trend_agrees
        && macd_agrees
}

fn exit_reasons(
    side: Side,
    confluence: &ConfluenceResult,
    candle: &Candle,
    snapshot: &IndicatorSnapshot,
    params: &ParamSet,
) -> Vec<ExitReason> {
    if candle.volume <= snapshot.volume_sma {
        return Vec::new();
    }

    let (against, rsi_extreme, trend_break) = match side {
        Side::Long => (
            Cross::Bearish,
            snapshot.rsi > params.rsi_overbought as f64,
            candle.close < snapshot.ema_trend,
        ),
        Side::Short => (
            Cross::Bullish,
            snapshot.rsi < params.rsi_oversold as f64,
            candle.close > snapshot.ema_trend,
        ),
    };
    let crosses = &confluence.crosses;

    [
        (crosses.ema == Some(against), ExitReason::EmaCross),
        (crosses.supertrend == Some(against), ExitReason::SupertrendFlip),
        (crosses.macd == Some(against), ExitReason::MacdCross),
        (rsi_extreme, ExitReason::RsiExtreme),
        (trend_break, ExitReason::TrendBreak),
    ]
    .into_iter()
    .filter_map(|(fired, reason)| fired.then_some(reason))
    .collect()
}

/// Decide entries and exits for a closed candle.
pub fn generate(
    confluence: &ConfluenceResult,
    candle: &Candle,
    snapshot: &IndicatorSnapshot,
    params: &ParamSet,
) -> SignalDecision {
    let long_exit_reasons = exit_reasons(Side::Long, confluence, candle, snapshot, params);
    let short_exit_reasons = exit_reasons(Side::Short, confluence, candle, snapshot, params);

    SignalDecision {
        enter_long: entry_allowed(Side::Long, confluence, candle, snapshot, params),
        enter_short: entry_allowed(Side::Short, confluence, candle, snapshot, params),
        exit_long: !long_exit_reasons.is_empty(),
        exit_short: !short_exit_reasons.is_empty(),
        long_exit_reasons,
        short_exit_reasons,
    }
}

/// Last check before an order goes out: the side still has enough
/// confirmations.
pub fn confirm_entry(side: Side, confluence: &ConfluenceResult, params: &ParamSet) -> bool {
    confluence.direction.side() == Some(side)
        && confluence.strength_for(side) >= params.min_trend_confirmations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{bearish_snapshot, bullish_snapshot, score};
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, close: f64, volume: f64) -> Candle {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        Candle::new(ts, open, open.max(close) + 0.5, open.min(close) - 0.5, close, volume)
    }

    fn decide(
        snap: &IndicatorSnapshot,
        prev: Option<&IndicatorSnapshot>,
        c: &Candle,
    ) -> SignalDecision {
        let params = ParamSet::default();
        let confluence = score(snap, prev, c.close, &params);
        generate(&confluence, c, snap, &params)
    }

    #[test]
    fn long_entry_when_every_gate_passes() {
        let d = decide(&bullish_snapshot(), None, &candle(104.0, 106.0, 1_500.0));
        assert!(d.enter_long);
        assert!(!d.enter_short);
        assert_eq!(d.entry_side(), Some(Side::Long));
        assert!(d.has_signal());
    }

    #[test]
    fn short_entry_mirrors() {
        let d = decide(&bearish_snapshot(), None, &candle(96.0, 94.0, 1_500.0));
        assert!(d.enter_short);
        assert!(!d.enter_long);
    }

    #[test]
    fn bearish_candle_blocks_long_entry() {
        let d = decide(&bullish_snapshot(), None, &candle(107.0, 106.0, 1_500.0));
        assert!(!d.enter_long);
    }

    #[test]
    fn low_volume_blocks_entry_and_exit() {
        let mut snap = bullish_snapshot();
        snap.rsi = 75.0;
        let d = decide(&snap, None, &candle(104.0, 106.0, 900.0));
        assert!(!d.enter_long);
        assert!(!d.exit_long);
        assert!(!d.has_signal());
    }

    #[test]
    fn rsi_extreme_blocks_entry_and_triggers_exit() {
        let mut snap = bullish_snapshot();
        snap.rsi = 75.0;
        let d = decide(&snap, None, &candle(104.0, 106.0, 1_500.0));
        assert!(!d.enter_long);
        assert!(d.exit_long);
        assert_eq!(d.long_exit_reasons, vec![ExitReason::RsiExtreme]);
    }

    #[test]
    fn close_above_upper_band_blocks_entry() {
        let d = decide(&bullish_snapshot(), None, &candle(108.0, 111.0, 1_500.0));
        assert!(!d.enter_long);
    }

    #[test]
    fn below_threshold_never_enters() {
        let mut snap = bullish_snapshot();
        snap.adx = 10.0;
        let d = decide(&snap, None, &candle(104.0, 106.0, 1_500.0));
        assert!(!d.enter_long);
    }

    #[test]
    fn crossing_exits_need_previous_snapshot() {
        let c = candle(97.0, 96.0, 1_500.0);
        let without = decide(&bearish_snapshot(), None, &c);
        // close 96 < trend EMA 100 is a level condition
        assert_eq!(without.long_exit_reasons, vec![ExitReason::TrendBreak]);

        let with = decide(&bearish_snapshot(), Some(&bullish_snapshot()), &c);
        assert_eq!(
            with.long_exit_reasons,
            vec![
                ExitReason::EmaCross,
                ExitReason::SupertrendFlip,
                ExitReason::MacdCross,
                ExitReason::TrendBreak,
            ]
        );
        assert!(!with.exit_short);
    }

    #[test]
    fn short_exit_on_bullish_flip() {
        let c = candle(104.0, 106.0, 1_500.0);
        let d = decide(&bullish_snapshot(), Some(&bearish_snapshot()), &c);
        assert!(d.exit_short);
        assert!(d.short_exit_reasons.contains(&ExitReason::EmaCross));
        assert!(d.short_exit_reasons.contains(&ExitReason::TrendBreak));
        assert!(!d.exit_long);
    }

    #[test]
    fn confirm_entry_rechecks_strength() {
        let params = ParamSet::default();
        let strong = score(&bullish_snapshot(), None, 106.0, &params);
        assert!(confirm_entry(Side::Long, &strong, &params));
        assert!(!confirm_entry(Side::Short, &strong, &params));

        let mut snap = bullish_snapshot();
        snap.macd_hist = -0.1;
        let weak = score(&snap, None, 106.0, &params);
        assert!(!confirm_entry(Side::Long, &weak, &params));
    }
}
