//! Scan configuration: which symbols to evaluate, where their candles live,
//! and the parameter overrides to evaluate them with.
//!
//! ```toml
//! timeframe = "5m"
//! synthetic = false
//!
//! [params]
//! min_trend_confirmations = 3
//!
//! [[symbols]]
//! symbol = "BTC/USDT"
//! path = "data/btc_5m.csv"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use multitrend_core::{EngineError, ParamSet, Timeframe};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Params(#[from] EngineError),

    #[error("config lists no symbols")]
    NoSymbols,

    #[error("symbol '{0}' listed more than once")]
    DuplicateSymbol(String),

    #[error("symbol '{0}' has no data path and synthetic data is disabled")]
    MissingPath(String),
}

/// Where one symbol's candles come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolSource {
    pub symbol: String,
    /// CSV file. Relative paths resolve against the config file's directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default)]
    pub timeframe: Timeframe,

    #[serde(default)]
    pub params: ParamSet,

    /// Generate synthetic candles for symbols whose data is missing.
    /// Developer-only; reports from synthetic data are tagged.
    #[serde(default)]
    pub synthetic: bool,

    /// Candles to generate per synthetic symbol.
    #[serde(default = "default_synthetic_candles")]
    pub synthetic_candles: usize,

    pub symbols: Vec<SymbolSource>,
}

fn default_synthetic_candles() -> usize {
    2_000
}

impl ScanConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file. Relative symbol paths are
    /// resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            for source in &mut config.symbols {
                if let Some(p) = source.path.as_mut() {
                    if p.is_relative() {
                        *p = base.join(&*p);
                    }
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        let mut seen = HashSet::new();
        for source in &self.symbols {
            if !seen.insert(source.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(source.symbol.clone()));
            }
            if source.path.is_none() && !self.synthetic {
                return Err(ConfigError::MissingPath(source.symbol.clone()));
            }
        }
        Ok(())
    }
}
