//! Error taxonomy shared by every stage of the pipeline.
//!
//! Three classes, none of which are retried internally:
//! - `InsufficientData`: the window has not covered the indicator warmup yet.
//!   Recoverable; the caller waits for more candles.
//! - `InvalidInput`: non-finite prices, non-monotonic timestamps, wrong spacing.
//!   Fatal for the window; no signal may be produced from it.
//! - `Configuration` / `ConfigParse`: a parameter bundle rejected at load time.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One tunable that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamViolation {
    pub name: String,
    pub value: f64,
    pub low: f64,
    pub high: f64,
    /// Set when an integer parameter received a fractional value.
    pub expected_integer: bool,
}

impl fmt::Display for ParamViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected_integer {
            write!(
                f,
                "{}={} must be an integer in [{}, {}]",
                self.name, self.value, self.low, self.high
            )
        } else {
            write!(
                f,
                "{}={} outside [{}, {}]",
                self.name, self.value, self.low, self.high
            )
        }
    }
}

/// Errors reported by the engine to its host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient data: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {}", join_violations(.0))]
    Configuration(Vec<ParamViolation>),

    #[error("failed to parse parameters: {0}")]
    ConfigParse(String),
}

impl EngineError {
    /// Only `InsufficientData` goes away on its own (by waiting for candles).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

fn join_violations(violations: &[ParamViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insufficient_data_is_recoverable() {
        assert!(EngineError::InsufficientData { have: 3, need: 100 }.is_recoverable());
        assert!(!EngineError::InvalidInput("nan close".into()).is_recoverable());
        assert!(!EngineError::Configuration(vec![]).is_recoverable());
    }

    #[test]
    fn configuration_message_lists_every_violation() {
        let err = EngineError::Configuration(vec![
            ParamViolation {
                name: "adx_threshold".into(),
                value: 50.0,
                low: 20.0,
                high: 35.0,
                expected_integer: false,
            },
            ParamViolation {
                name: "rsi_period".into(),
                value: 12.5,
                low: 10.0,
                high: 20.0,
                expected_integer: true,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("adx_threshold=50 outside [20, 35]"));
        assert!(msg.contains("rsi_period=12.5 must be an integer"));
    }
}
