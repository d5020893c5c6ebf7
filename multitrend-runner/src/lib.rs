//! MultiTrend Runner: host-side plumbing around `multitrend-core`.
//!
//! - TOML scan configuration (symbols, timeframe, parameter overrides)
//! - CSV candle loading with validation, synthetic fallback for development
//! - Parallel per-symbol scan, one isolated engine per symbol
//! - Tracing subscriber setup

pub mod config;
pub mod data_loader;
pub mod logging;
pub mod scan;
pub mod synthetic;

pub use config::{ConfigError, ScanConfig, SymbolSource};
pub use data_loader::{dataset_hash, load_csv, read_candles, write_candles, DataSource, LoadError};
pub use logging::init_tracing;
pub use scan::{
    events_for, replay_symbol, scan, scan_symbol, ScanError, ScanOutcome, SignalEvent, SignalKind,
    SymbolReport,
};
pub use synthetic::generate_synthetic_candles;
