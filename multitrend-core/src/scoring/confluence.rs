//! Confluence scorer: six indicator tests folded into one directional score.
//!
//! Only EMA, ADX, Supertrend and MACD are directional votes. RSI and Bollinger
//! are "not at an extreme" tests that pass for both sides at once; they are
//! reported in the counts but never move the strength.

use serde::{Deserialize, Serialize};

use crate::domain::Side;
use crate::indicators::{IndicatorSnapshot, TrendDirection};
use crate::params::ParamSet;

/// Highest possible strength: all four directional indicators agree.
pub const MAX_STRENGTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Ema,
    Adx,
    Supertrend,
    Macd,
    Rsi,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::Ema,
        IndicatorKind::Adx,
        IndicatorKind::Supertrend,
        IndicatorKind::Macd,
        IndicatorKind::Rsi,
        IndicatorKind::Bollinger,
    ];

    /// Whether the indicator votes on direction (as opposed to acting as a gate).
    pub fn is_directional(self) -> bool {
        !matches!(self, IndicatorKind::Rsi | IndicatorKind::Bollinger)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorVote {
    pub indicator: IndicatorKind,
    pub bullish: bool,
    pub bearish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
    #[serde(rename = "none")]
    Neutral,
}

impl Direction {
    pub fn side(self) -> Option<Side> {
        match self {
            Direction::Long => Some(Side::Long),
            Direction::Short => Some(Side::Short),
            Direction::Neutral => None,
        }
    }
}

/// A transition between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cross {
    Bullish,
    Bearish,
}

/// Crossovers seen on this candle. All `None` without a previous snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crosses {
    /// Fast EMA crossed the slow EMA.
    pub ema: Option<Cross>,
    /// MACD histogram changed sign.
    pub macd: Option<Cross>,
    /// Supertrend direction flipped.
    pub supertrend: Option<Cross>,
}

impl Crosses {
    pub fn between(previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Self {
        let ema = if current.ema_fast < current.ema_slow && previous.ema_fast >= previous.ema_slow {
            Some(Cross::Bearish)
        } else if current.ema_fast > current.ema_slow && previous.ema_fast <= previous.ema_slow {
            Some(Cross::Bullish)
        } else {
            None
        };

        let macd = if current.macd_hist < 0.0 && previous.macd_hist >= 0.0 {
            Some(Cross::Bearish)
        } else if current.macd_hist > 0.0 && previous.macd_hist <= 0.0 {
            Some(Cross::Bullish)
        } else {
            None
        };

        let supertrend = match (previous.supertrend_direction, current.supertrend_direction) {
            (TrendDirection::Up, TrendDirection::Down) => Some(Cross::Bearish),
            (TrendDirection::Down, TrendDirection::Up) => Some(Cross::Bullish),
            _ => None,
        };

        Self {
            ema,
            macd,
            supertrend,
        }
    }
}

/// Scored confluence for one closed candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    pub votes: [IndicatorVote; 6],
    /// Bullish tests passed, out of six.
    pub bullish_count: u32,
    /// Bearish tests passed, out of six.
    pub bearish_count: u32,
    /// Directional bullish votes, out of four.
    pub bullish_strength: u32,
    /// Directional bearish votes, out of four.
    pub bearish_strength: u32,
    pub strength: u32,
    /// bullish_strength - bearish_strength, in [-4, 4].
    pub trend_score: i32,
    pub direction: Direction,
    pub crosses: Crosses,
}

impl ConfluenceResult {
    pub fn strength_for(&self, side: Side) -> u32 {
        match side {
            Side::Long => self.bullish_strength,
            Side::Short => self.bearish_strength,
        }
    }

    pub fn vote(&self, indicator: IndicatorKind) -> IndicatorVote {
        self.votes[indicator as usize]
    }

    /// RSI inside the neutral band.
    pub fn rsi_neutral(&self) -> bool {
        self.vote(IndicatorKind::Rsi).bullish
    }

    /// Close strictly inside the Bollinger bands.
    pub fn inside_bands(&self) -> bool {
        self.vote(IndicatorKind::Bollinger).bullish
    }
}

fn vote(indicator: IndicatorKind, bullish: bool, bearish: bool) -> IndicatorVote {
    IndicatorVote {
        indicator,
        bullish,
        bearish,
    }
}

/// Score the latest snapshot. `previous` is the snapshot of the candle before
/// and only feeds crossover detection.
pub fn score(
    snapshot: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    close: f64,
    params: &ParamSet,
) -> ConfluenceResult {
    let s = snapshot;
    let trending = s.adx > params.adx_threshold as f64;
    let rsi_neutral =
        (params.rsi_oversold as f64) < s.rsi && s.rsi < params.rsi_overbought as f64;
    let inside_bands = s.bb_lower < close && close < s.bb_upper;

    let votes = [
        vote(IndicatorKind::Ema, s.ema_fast > s.ema_slow, s.ema_fast < s.ema_slow),
        vote(
            IndicatorKind::Adx,
            trending && close > s.ema_trend,
            trending && close < s.ema_trend,
        ),
        vote(
            IndicatorKind::Supertrend,
            s.supertrend_direction == TrendDirection::Up,
            s.supertrend_direction == TrendDirection::Down,
        ),
        vote(IndicatorKind::Macd, s.macd_hist > 0.0, s.macd_hist < 0.0),
        vote(IndicatorKind::Rsi, rsi_neutral, rsi_neutral),
        vote(IndicatorKind::Bollinger, inside_bands, inside_bands),
    ];

    let count = |pred: fn(&IndicatorVote) -> bool, directional_only: bool| {
        votes
            .iter()
            .filter(|v| !directional_only || v.indicator.is_directional())
            .filter(|v| pred(v))
            .count() as u32
    };
    let bullish_count = count(|v| v.bullish, false);
    let bearish_count = count(|v| v.bearish, false);
    let bullish_strength = count(|v| v.bullish, true);
    let bearish_strength = count(|v| v.bearish, true);

    let min = params.min_trend_confirmations;
    let direction = if bullish_strength > bearish_strength && bullish_strength >= min {
        Direction::Long
    } else if bearish_strength > bullish_strength && bearish_strength >= min {
        Direction::Short
    } else {
        Direction::Neutral
    };

    ConfluenceResult {
        votes,
        bullish_count,
        bearish_count,
        bullish_strength,
        bearish_strength,
        strength: bullish_strength.max(bearish_strength),
        trend_score: bullish_strength as i32 - bearish_strength as i32,
        direction,
        crosses: previous
            .map(|prev| Crosses::between(prev, snapshot))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
pub(crate) fn bullish_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema_fast: 105.0,
        ema_slow: 103.0,
        ema_trend: 100.0,
        adx: 30.0,
        di_plus: 28.0,
        di_minus: 12.0,
        supertrend: 101.0,
        supertrend_direction: TrendDirection::Up,
        macd_line: 1.2,
        macd_signal: 0.8,
        macd_hist: 0.4,
        rsi: 55.0,
        bb_upper: 110.0,
        bb_mid: 104.0,
        bb_lower: 98.0,
        bb_width: 12.0 / 104.0,
        volume_sma: 1_000.0,
    }
}

#[cfg(test)]
pub(crate) fn bearish_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema_fast: 95.0,
        ema_slow: 97.0,
        ema_trend: 100.0,
        adx: 30.0,
        di_plus: 12.0,
        di_minus: 28.0,
        supertrend: 99.0,
        supertrend_direction: TrendDirection::Down,
        macd_line: -1.2,
        macd_signal: -0.8,
        macd_hist: -0.4,
        rsi: 45.0,
        bb_upper: 102.0,
        bb_mid: 96.0,
        bb_lower: 90.0,
        bb_width: 12.0 / 96.0,
        volume_sma: 1_000.0,
    }
}
