//! Confluence scoring.

pub mod confluence;

pub use confluence::{
    score, ConfluenceResult, Cross, Crosses, Direction, IndicatorKind, IndicatorVote, MAX_STRENGTH,
};

#[cfg(test)]
pub(crate) use confluence::{bearish_snapshot, bullish_snapshot};
