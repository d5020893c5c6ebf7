//! Multi-symbol scan: one independent engine per symbol, run in parallel.
//!
//! Symbols share nothing. A symbol that fails to load or evaluate is reported
//! as a failure without affecting the others.

use chrono::{DateTime, Utc};
use multitrend_core::risk::RiskParameters;
use multitrend_core::signals::ExitReason;
use multitrend_core::{Candle, EngineError, Evaluation, ParamSet, SignalEngine, Timeframe};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ScanConfig, SymbolSource};
use crate::data_loader::{dataset_hash, load_csv, DataSource, LoadError};
use crate::synthetic::generate_synthetic_candles;

/// 2024-01-01T00:00:00Z, the first synthetic candle.
const SYNTHETIC_START_MS: i64 = 1_704_067_200_000;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{symbol}: {source}")]
    Load {
        symbol: String,
        #[source]
        source: LoadError,
    },

    #[error("{symbol}: {source}")]
    Engine {
        symbol: String,
        #[source]
        source: EngineError,
    },
}

impl ScanError {
    pub fn symbol(&self) -> &str {
        match self {
            ScanError::Load { symbol, .. } | ScanError::Engine { symbol, .. } => symbol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

/// One flag raised on one candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    pub close: f64,
    pub strength: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<ExitReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskParameters>,
}

/// Summary of one symbol's replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub source: DataSource,
    pub dataset_hash: String,
    pub candles: usize,
    /// Candles past warmup.
    pub evaluated: usize,
    pub events: Vec<SignalEvent>,
    /// Evaluation of the most recent candle.
    pub last: Option<Evaluation>,
}

impl SymbolReport {
    pub fn count(&self, kind: SignalKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Reports for every symbol that succeeded, failures for the rest.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub reports: Vec<SymbolReport>,
    pub failures: Vec<ScanError>,
}

/// Flatten one evaluation into its raised flags.
pub fn events_for(eval: &Evaluation) -> Vec<SignalEvent> {
    let d = &eval.decision;
    if !d.has_signal() {
        return Vec::new();
    }
    let c = &eval.confluence;
    let event = |kind, strength, reasons: &[ExitReason], risk: Option<RiskParameters>| SignalEvent {
        timestamp: eval.timestamp,
        kind,
        close: eval.close,
        strength,
        reasons: reasons.to_vec(),
        risk,
    };

    let mut events = Vec::new();
    if d.enter_long {
        events.push(event(SignalKind::EnterLong, c.bullish_strength, &[], eval.risk.clone()));
    }
    if d.enter_short {
        events.push(event(SignalKind::EnterShort, c.bearish_strength, &[], eval.risk.clone()));
    }
    if d.exit_long {
        events.push(event(SignalKind::ExitLong, c.bullish_strength, &d.long_exit_reasons, None));
    }
    if d.exit_short {
        events.push(event(SignalKind::ExitShort, c.bearish_strength, &d.short_exit_reasons, None));
    }
    events
}

/// Replay a loaded series through a fresh engine.
pub fn replay_symbol(
    symbol: &str,
    source: DataSource,
    candles: &[Candle],
    params: &ParamSet,
    timeframe: Timeframe,
) -> Result<SymbolReport, EngineError> {
    let mut engine = SignalEngine::new(params.clone(), timeframe)?;
    let evals = engine.replay(candles)?;

    let mut events = Vec::new();
    for eval in &evals {
        for event in events_for(eval) {
            debug!(
                symbol,
                timestamp = %event.timestamp,
                kind = ?event.kind,
                strength = event.strength,
                reasons = ?event.reasons,
                "signal"
            );
            events.push(event);
        }
    }

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        source,
        dataset_hash: dataset_hash(candles),
        candles: candles.len(),
        evaluated: evals.len(),
        events,
        last: evals.last().cloned(),
    })
}

fn load_symbol(config: &ScanConfig, source: &SymbolSource) -> Result<(DataSource, Vec<Candle>), LoadError> {
    match &source.path {
        Some(path) if path.exists() || !config.synthetic => {
            Ok((DataSource::Csv, load_csv(path, config.timeframe)?))
        }
        _ => {
            warn!(
                symbol = %source.symbol,
                "generating synthetic candles; report will be tagged synthetic"
            );
            let start = DateTime::from_timestamp_millis(SYNTHETIC_START_MS).unwrap_or_default();
            Ok((
                DataSource::Synthetic,
                generate_synthetic_candles(
                    &source.symbol,
                    start,
                    config.synthetic_candles,
                    config.timeframe,
                ),
            ))
        }
    }
}

/// Load and replay one symbol.
pub fn scan_symbol(config: &ScanConfig, source: &SymbolSource) -> Result<SymbolReport, ScanError> {
    let (kind, candles) = load_symbol(config, source).map_err(|e| ScanError::Load {
        symbol: source.symbol.clone(),
        source: e,
    })?;
    let report = replay_symbol(&source.symbol, kind, &candles, &config.params, config.timeframe)
        .map_err(|e| ScanError::Engine {
            symbol: source.symbol.clone(),
            source: e,
        })?;

    info!(
        symbol = %report.symbol,
        candles = report.candles,
        evaluated = report.evaluated,
        enter_long = report.count(SignalKind::EnterLong),
        enter_short = report.count(SignalKind::EnterShort),
        "symbol scanned"
    );
    Ok(report)
}

/// Scan every symbol in the config. Output order follows the config.
pub fn scan(config: &ScanConfig, parallel: bool) -> ScanOutcome {
    info!(
        symbols = config.symbols.len(),
        timeframe = %config.timeframe,
        params = %config.params.full_hash(),
        "starting scan"
    );

    let results: Vec<Result<SymbolReport, ScanError>> = if parallel {
        config
            .symbols
            .par_iter()
            .map(|source| scan_symbol(config, source))
            .collect()
    } else {
        config
            .symbols
            .iter()
            .map(|source| scan_symbol(config, source))
            .collect()
    };

    let mut outcome = ScanOutcome::default();
    for result in results {
        match result {
            Ok(report) => outcome.reports.push(report),
            Err(e) => {
                warn!(symbol = e.symbol(), error = %e, "symbol skipped");
                outcome.failures.push(e);
            }
        }
    }

    info!(
        ok = outcome.reports.len(),
        failed = outcome.failures.len(),
        "scan finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_config(symbols: &[&str]) -> ScanConfig {
        ScanConfig {
            timeframe: Timeframe::default(),
            params: ParamSet::default(),
            synthetic: true,
            synthetic_candles: 600,
            symbols: symbols
                .iter()
                .map(|s| SymbolSource {
                    symbol: s.to_string(),
                    path: None,
                })
                .collect(),
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = synthetic_config(&["AAA", "BBB", "CCC", "DDD"]);
        let par = scan(&config, true);
        let seq = scan(&config, false);
        assert!(par.failures.is_empty());
        assert_eq!(par.reports, seq.reports);
        let names: Vec<_> = par.reports.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(names, vec!["AAA", "BBB", "CCC", "DDD"]);
    }

    #[test]
    fn synthetic_reports_are_tagged() {
        let outcome = scan(&synthetic_config(&["AAA"]), false);
        let report = &outcome.reports[0];
        assert_eq!(report.source, DataSource::Synthetic);
        assert_eq!(report.candles, 600);
        assert_eq!(report.evaluated, 600 - 99);
        assert!(report.last.is_some());
    }

    #[test]
    fn missing_file_is_a_failure_not_a_panic() {
        let mut config = synthetic_config(&["AAA", "BBB"]);
        config.synthetic = false;
        config.symbols[1].path = Some("/nonexistent/multitrend/bbb.csv".into());
        config.symbols[0].path = Some("/nonexistent/multitrend/aaa.csv".into());
        let outcome = scan(&config, true);
        assert!(outcome.reports.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.failures[0], ScanError::Load { .. }));
    }

    #[test]
    fn short_series_yields_empty_report() {
        let candles = generate_synthetic_candles(
            "AAA",
            DateTime::from_timestamp_millis(SYNTHETIC_START_MS).unwrap(),
            50,
            Timeframe::default(),
        );
        let report = replay_symbol(
            "AAA",
            DataSource::Synthetic,
            &candles,
            &ParamSet::default(),
            Timeframe::default(),
        )
        .unwrap();
        assert_eq!(report.evaluated, 0);
        assert!(report.events.is_empty());
        assert!(report.last.is_none());
    }

    #[test]
    fn report_json_is_tagged() {
        let outcome = scan(&synthetic_config(&["AAA"]), false);
        let json = serde_json::to_value(&outcome.reports[0]).unwrap();
        assert_eq!(json["source"], "synthetic");
        assert_eq!(json["symbol"], "AAA");
        assert!(json["last"]["confluence"]["direction"].is_string());
    }

    #[test]
    fn entry_events_carry_risk() {
        let outcome = scan(&synthetic_config(&["AAA", "BBB", "CCC"]), false);
        for report in &outcome.reports {
            for event in &report.events {
                let is_entry = matches!(event.kind, SignalKind::EnterLong | SignalKind::EnterShort);
                assert_eq!(event.risk.is_some(), is_entry);
            }
        }
    }
}
