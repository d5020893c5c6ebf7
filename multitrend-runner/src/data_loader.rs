//! Candle loading for the runner.
//!
//! CSV with header `timestamp,open,high,low,close,volume`. Timestamps are the
//! candle open time, either RFC 3339 or integer epoch milliseconds. Loaded
//! series are validated (finite, strictly increasing, fixed spacing) before
//! they reach an engine.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use multitrend_core::domain::validate_series;
use multitrend_core::{Candle, EngineError, Timeframe};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("no candles in input")]
    Empty,

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Where a symbol's candles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parse an RFC 3339 timestamp or integer epoch milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ms) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Read candles from any CSV source and validate them against `timeframe`.
pub fn read_candles<R: Read>(reader: R, timeframe: Timeframe) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: i + 1,
            value: row.timestamp.clone(),
        })?;
        candles.push(Candle::new(
            timestamp, row.open, row.high, row.low, row.close, row.volume,
        ));
    }

    if candles.is_empty() {
        return Err(LoadError::Empty);
    }
    validate_series(&candles, timeframe)?;
    Ok(candles)
}

/// Load and validate a CSV file.
pub fn load_csv(path: &Path, timeframe: Timeframe) -> Result<Vec<Candle>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_candles(file, timeframe)
}

/// Write candles as CSV (RFC 3339 timestamps).
pub fn write_candles<W: std::io::Write>(writer: W, candles: &[Candle]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for c in candles {
        wtr.write_record([
            c.timestamp.to_rfc3339(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Deterministic BLAKE3 hash over every candle, for tagging reports.
pub fn dataset_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in candles {
        hasher.update(&c.timestamp.timestamp_millis().to_le_bytes());
        hasher.update(&c.open.to_le_bytes());
        hasher.update(&c.high.to_le_bytes());
        hasher.update(&c.low.to_le_bytes());
        hasher.update(&c.close.to_le_bytes());
        hasher.update(&c.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
