//! Timeframe: the fixed spacing between consecutive candles.
//!
//! Written as `<n>m`, `<n>h` or `<n>d` ("5m", "1h", "1d").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// Candle interval in whole minutes. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    minutes: u32,
}

impl Timeframe {
    pub fn from_minutes(minutes: u32) -> Result<Self, EngineError> {
        if minutes == 0 {
            return Err(EngineError::InvalidInput(
                "timeframe must be at least one minute".into(),
            ));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.minutes))
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self { minutes: 5 }
    }
}

impl FromStr for Timeframe {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || EngineError::InvalidInput(format!("unrecognised timeframe '{s}'"));

        let split = s.len().checked_sub(1).ok_or_else(invalid)?;
        if !s.is_char_boundary(split) {
            return Err(invalid());
        }
        let (count, unit) = s.split_at(split);
        let count: u32 = count.parse().map_err(|_| invalid())?;
        let scale = match unit {
            "m" => 1,
            "h" => MINUTES_PER_HOUR,
            "d" => MINUTES_PER_DAY,
            _ => return Err(invalid()),
        };
        let minutes = count.checked_mul(scale).ok_or_else(invalid)?;
        Self::from_minutes(minutes)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes % MINUTES_PER_DAY == 0 {
            write!(f, "{}d", self.minutes / MINUTES_PER_DAY)
        } else if self.minutes % MINUTES_PER_HOUR == 0 {
            write!(f, "{}h", self.minutes / MINUTES_PER_HOUR)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}
