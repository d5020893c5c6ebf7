//! Strategy parameters: the sixteen tunables, their bounds and search spaces.
//!
//! A `ParamSet` is immutable once validated. Out-of-range values are reported,
//! never clamped. The bounds table doubles as the search space exported to
//! external optimizers.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ParamViolation};
use crate::indicators::VOLUME_SMA_PERIOD;

/// Integer or continuous tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Int,
    Float,
}

/// Optimizer space a parameter belongs to: entry-side or exit-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSpace {
    Buy,
    Sell,
}

/// One row of the bounds table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub low: f64,
    pub high: f64,
    pub default: f64,
    pub space: SearchSpace,
}

const fn int(name: &'static str, low: f64, high: f64, default: f64) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Int,
        low,
        high,
        default,
        space: SearchSpace::Buy,
    }
}

const fn float(name: &'static str, low: f64, high: f64, default: f64) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Float,
        low,
        high,
        default,
        space: SearchSpace::Buy,
    }
}

/// Bounds, defaults and spaces for every tunable, in canonical order.
pub const PARAM_SPECS: [ParamSpec; 16] = [
    int("ema_fast_period", 8.0, 20.0, 12.0),
    int("ema_slow_period", 20.0, 50.0, 26.0),
    int("ema_trend_period", 50.0, 200.0, 100.0),
    int("adx_period", 10.0, 20.0, 14.0),
    int("adx_threshold", 20.0, 35.0, 25.0),
    int("rsi_period", 10.0, 20.0, 14.0),
    ParamSpec {
        space: SearchSpace::Sell,
        ..int("rsi_overbought", 65.0, 80.0, 70.0)
    },
    int("rsi_oversold", 20.0, 35.0, 30.0),
    int("macd_fast", 8.0, 15.0, 12.0),
    int("macd_slow", 20.0, 30.0, 26.0),
    int("macd_signal", 7.0, 12.0, 9.0),
    int("supertrend_period", 7.0, 14.0, 10.0),
    float("supertrend_multiplier", 2.0, 4.0, 3.0),
    int("bb_period", 15.0, 25.0, 20.0),
    float("bb_std", 1.5, 2.5, 2.0),
    int("min_trend_confirmations", 3.0, 5.0, 4.0),
];

/// The full parameter bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamSet {
    pub ema_fast_period: u32,
    pub ema_slow_period: u32,
    pub ema_trend_period: u32,
    pub adx_period: u32,
    pub adx_threshold: u32,
    pub rsi_period: u32,
    pub rsi_overbought: u32,
    pub rsi_oversold: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub supertrend_period: u32,
    pub supertrend_multiplier: f64,
    pub bb_period: u32,
    pub bb_std: f64,
    pub min_trend_confirmations: u32,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            ema_fast_period: 12,
            ema_slow_period: 26,
            ema_trend_period: 100,
            adx_period: 14,
            adx_threshold: 25,
            rsi_period: 14,
            rsi_overbought: 70,
            rsi_oversold: 30,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            bb_period: 20,
            bb_std: 2.0,
            min_trend_confirmations: 4,
        }
    }
}

impl ParamSet {
    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let v = match name {
            "ema_fast_period" => self.ema_fast_period as f64,
            "ema_slow_period" => self.ema_slow_period as f64,
            "ema_trend_period" => self.ema_trend_period as f64,
            "adx_period" => self.adx_period as f64,
            "adx_threshold" => self.adx_threshold as f64,
            "rsi_period" => self.rsi_period as f64,
            "rsi_overbought" => self.rsi_overbought as f64,
            "rsi_oversold" => self.rsi_oversold as f64,
            "macd_fast" => self.macd_fast as f64,
            "macd_slow" => self.macd_slow as f64,
            "macd_signal" => self.macd_signal as f64,
            "supertrend_period" => self.supertrend_period as f64,
            "supertrend_multiplier" => self.supertrend_multiplier,
            "bb_period" => self.bb_period as f64,
            "bb_std" => self.bb_std,
            "min_trend_confirmations" => self.min_trend_confirmations as f64,
            _ => return None,
        };
        Some(v)
    }

    /// Set a parameter by name. Integer parameters must receive whole,
    /// non-negative values; range checks are left to `validate`.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        let spec = spec_for(name)
            .ok_or_else(|| EngineError::ConfigParse(format!("unknown parameter '{name}'")))?;

        let slot = match name {
            "supertrend_multiplier" => {
                self.supertrend_multiplier = value;
                return Ok(());
            }
            "bb_std" => {
                self.bb_std = value;
                return Ok(());
            }
            "ema_fast_period" => &mut self.ema_fast_period,
            "ema_slow_period" => &mut self.ema_slow_period,
            "ema_trend_period" => &mut self.ema_trend_period,
            "adx_period" => &mut self.adx_period,
            "adx_threshold" => &mut self.adx_threshold,
            "rsi_period" => &mut self.rsi_period,
            "rsi_overbought" => &mut self.rsi_overbought,
            "rsi_oversold" => &mut self.rsi_oversold,
            "macd_fast" => &mut self.macd_fast,
            "macd_slow" => &mut self.macd_slow,
            "macd_signal" => &mut self.macd_signal,
            "supertrend_period" => &mut self.supertrend_period,
            "bb_period" => &mut self.bb_period,
            "min_trend_confirmations" => &mut self.min_trend_confirmations,
            _ => return Err(EngineError::ConfigParse(format!("unknown parameter '{name}'"))),
        };

        if value.fract() != 0.0 || !(0.0..=u32::MAX as f64).contains(&value) {
            return Err(EngineError::Configuration(vec![spec.violation(value, true)]));
        }
        *slot = value as u32;
        Ok(())
    }

    /// Apply a list of `(name, value)` overrides, then validate.
    pub fn with_overrides(mut self, overrides: &[(&str, f64)]) -> Result<Self, EngineError> {
        for (name, value) in overrides {
            self.set(name, *value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check every parameter against its bounds. All violations are reported.
    pub fn validate(&self) -> Result<(), EngineError> {
        let violations: Vec<ParamViolation> = PARAM_SPECS
            .iter()
            .filter_map(|spec| {
                let value = self.get(spec.name)?;
                let in_range = value >= spec.low && value <= spec.high;
                (!in_range).then(|| spec.violation(value, false))
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Configuration(violations))
        }
    }

    /// Parse a TOML parameter table. Missing keys take defaults, unknown keys
    /// are rejected, and the result is validated.
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let params: ParamSet =
            toml::from_str(s).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// The bounds table, for external optimizers.
    pub fn search_space() -> &'static [ParamSpec] {
        &PARAM_SPECS
    }

    /// BLAKE3 hash over the canonical JSON of every parameter value.
    ///
    /// Identical parameter bundles hash identically, so optimizers can key
    /// result caches on it.
    pub fn full_hash(&self) -> String {
        let canonical: serde_json::Map<String, serde_json::Value> = PARAM_SPECS
            .iter()
            .filter_map(|spec| {
                let value = self.get(spec.name)?;
                Some((spec.name.to_string(), serde_json::Value::from(value)))
            })
            .collect();
        let canonical = serde_json::Value::Object(canonical);
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }

    /// Candles the indicator bank needs before its first snapshot.
    pub fn warmup(&self) -> usize {
        let ema = self
            .ema_fast_period
            .max(self.ema_slow_period)
            .max(self.ema_trend_period) as usize;
        let adx = 2 * self.adx_period as usize;
        let supertrend = self.supertrend_period as usize + 1;
        let macd = (self.macd_fast.max(self.macd_slow) as usize + self.macd_signal as usize)
            .saturating_sub(1);
        let rsi = self.rsi_period as usize + 1;
        let bb = self.bb_period as usize;

        [ema, adx, supertrend, macd, rsi, bb, VOLUME_SMA_PERIOD]
            .into_iter()
            .max()
            .unwrap_or(VOLUME_SMA_PERIOD)
    }
}

impl ParamSpec {
    fn violation(&self, value: f64, expected_integer: bool) -> ParamViolation {
        ParamViolation {
            name: self.name.to_string(),
            value,
            low: self.low,
            high: self.high,
            expected_integer,
        }
    }
}

fn spec_for(name: &str) -> Option<&'static ParamSpec> {
    PARAM_SPECS.iter().find(|s| s.name == name)
}
