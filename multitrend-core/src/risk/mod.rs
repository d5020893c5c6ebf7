//! Risk parameters derived from trend strength.
//!
//! - `stoploss`: strength-scaled stop table
//! - `trailing`: fixed trailing stop
//! - `roi`: time-decaying take-profit ladder

pub mod roi;
pub mod stoploss;
pub mod trailing;

pub use roi::{RoiLadder, RoiRung};
pub use stoploss::{stoploss_for_entry, stoploss_for_open_trade};
pub use trailing::TrailingStop;

use serde::{Deserialize, Serialize};

use crate::domain::Side;
use crate::scoring::MAX_STRENGTH;

/// Return of a position at `price` as a fraction of the entry price.
pub fn unrealized_return(side: Side, entry_price: f64, price: f64) -> f64 {
    match side {
        Side::Long => price / entry_price - 1.0,
        Side::Short => 1.0 - price / entry_price,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    pub strength: u32,
    /// Negative fraction of the entry price.
    pub stoploss_pct: f64,
    pub trailing: TrailingStop,
    pub roi_ladder: RoiLadder,
    /// Scales the host's stake: full size at strength 4.
    pub position_size_multiplier: f64,
}

impl RiskParameters {
    /// Risk for a new entry. None when the strength cannot support one.
    pub fn for_entry(strength: u32) -> Option<Self> {
        let stoploss_pct = stoploss_for_entry(strength)?;
        Some(Self::build(strength, stoploss_pct))
    }

    /// Risk for a trade already open, re-derived from the current strength.
    pub fn for_open_trade(strength: u32) -> Self {
        Self::build(strength, stoploss_for_open_trade(strength))
    }

    fn build(strength: u32, stoploss_pct: f64) -> Self {
        Self {
            strength,
            stoploss_pct,
            trailing: TrailingStop::default(),
            roi_ladder: RoiLadder::default(),
            position_size_multiplier: strength.min(MAX_STRENGTH) as f64 / MAX_STRENGTH as f64,
        }
    }
}
