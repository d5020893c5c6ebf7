//! MultiTrend CLI.
//!
//! Commands:
//! - `scan`: evaluate every symbol of a TOML scan config in parallel
//! - `replay`: stream one CSV through the engine and print its signals
//! - `evaluate`: evaluate the last closed candle of a CSV window
//! - `params`: print defaults, the optimizer search space, or a parameter hash
//! - `synth`: write a deterministic synthetic candle series as CSV

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use multitrend_core::{evaluate_window, Evaluation, ParamSet, SignalEngine, Timeframe};
use multitrend_runner::{
    events_for, generate_synthetic_candles, init_tracing, load_csv, scan, write_candles,
    ScanConfig, SignalKind, SymbolReport,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "multitrend",
    about = "MultiTrend CLI: multi-indicator trend confluence signals"
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every symbol listed in a TOML config.
    Scan {
        /// Path to the scan config.
        #[arg(long)]
        config: PathBuf,

        /// Print one JSON report per line instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Evaluate symbols one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Stream a CSV through the engine and print every raised signal.
    Replay {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: PathBuf,

        /// Candle interval, e.g. 5m, 1h, 1d.
        #[arg(long, default_value = "5m")]
        timeframe: Timeframe,

        /// TOML file with parameter overrides.
        #[arg(long)]
        params: Option<PathBuf>,

        /// Print every evaluation, not only candles that raised a signal.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Evaluate the most recent closed candle of a CSV.
    Evaluate {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long, default_value = "5m")]
        timeframe: Timeframe,

        #[arg(long)]
        params: Option<PathBuf>,

        /// Evaluation time (RFC 3339). Defaults to now. A trailing candle
        /// that closes after this is still forming and is ignored.
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Parameter utilities.
    Params {
        #[command(subcommand)]
        action: ParamsAction,
    },
    /// Write a synthetic candle series (development only).
    Synth {
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 2_000)]
        count: usize,

        #[arg(long, default_value = "5m")]
        timeframe: Timeframe,

        /// First candle open time (RFC 3339).
        #[arg(long, default_value = "2024-01-01T00:00:00Z")]
        start: String,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ParamsAction {
    /// Print the default parameter set as JSON.
    Defaults,
    /// Print the bounds table exported to optimizers.
    SearchSpace,
    /// Validate a parameter file and print its hash and warmup.
    Check {
        #[arg(long)]
        params: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs).context("failed to install tracing subscriber")?;

    match cli.command {
        Commands::Scan {
            config,
            json,
            sequential,
        } => run_scan(&config, json, !sequential),
        Commands::Replay {
            csv,
            timeframe,
            params,
            all,
        } => run_replay(&csv, timeframe, params.as_deref(), all),
        Commands::Evaluate {
            csv,
            timeframe,
            params,
            as_of,
        } => run_evaluate(&csv, timeframe, params.as_deref(), as_of.as_deref()),
        Commands::Params { action } => match action {
            ParamsAction::Defaults => print_json(&ParamSet::default()),
            ParamsAction::SearchSpace => print_json(ParamSet::search_space()),
            ParamsAction::Check { params } => run_params_check(params.as_deref()),
        },
        Commands::Synth {
            symbol,
            count,
            timeframe,
            start,
            out,
        } => run_synth(&symbol, count, timeframe, &start, out.as_deref()),
    }
}

fn load_params(path: Option<&Path>) -> Result<ParamSet> {
    let Some(path) = path else {
        return Ok(ParamSet::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ParamSet::from_toml_str(&text).with_context(|| format!("invalid parameters in {}", path.display()))
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid RFC 3339 time '{value}'"))?
        .with_timezone(&Utc))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_scan(config_path: &Path, json: bool, parallel: bool) -> Result<()> {
    let config = ScanConfig::from_file(config_path)?;
    let outcome = scan(&config, parallel);

    if json {
        for report in &outcome.reports {
            println!("{}", serde_json::to_string(report)?);
        }
    } else {
        print_scan_table(&outcome.reports);
    }

    for failure in &outcome.failures {
        eprintln!("Error for {}: {failure}", failure.symbol());
    }
    if !outcome.failures.is_empty() {
        bail!(
            "{} of {} symbols failed",
            outcome.failures.len(),
            config.symbols.len()
        );
    }
    Ok(())
}

fn print_scan_table(reports: &[SymbolReport]) {
    println!(
        "{:<14} {:<9} {:>7} {:>6} {:>6} {:>6} {:>6}  {:<6} {:>3}",
        "symbol", "source", "candles", "L-in", "S-in", "L-out", "S-out", "trend", "str"
    );
    for r in reports {
        let (direction, strength) = r
            .last
            .as_ref()
            .map(|e| (format!("{:?}", e.confluence.direction), e.confluence.strength))
            .unwrap_or_else(|| ("-".to_string(), 0));
        println!(
            "{:<14} {:<9} {:>7} {:>6} {:>6} {:>6} {:>6}  {:<6} {:>3}",
            r.symbol,
            format!("{:?}", r.source),
            r.candles,
            r.count(SignalKind::EnterLong),
            r.count(SignalKind::EnterShort),
            r.count(SignalKind::ExitLong),
            r.count(SignalKind::ExitShort),
            direction,
            strength,
        );
    }
}

fn run_replay(csv: &Path, timeframe: Timeframe, params: Option<&Path>, all: bool) -> Result<()> {
    let params = load_params(params)?;
    let candles = load_csv(csv, timeframe)?;
    let mut engine = SignalEngine::new(params, timeframe)?;
    let evals = engine.replay(&candles)?;

    let mut raised = 0usize;
    for eval in &evals {
        if all {
            println!("{}", serde_json::to_string(eval)?);
            continue;
        }
        for event in events_for(eval) {
            raised += 1;
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    info!(
        candles = candles.len(),
        evaluated = evals.len(),
        signals = raised,
        "replay finished"
    );
    Ok(())
}

fn run_evaluate(
    csv: &Path,
    timeframe: Timeframe,
    params: Option<&Path>,
    as_of: Option<&str>,
) -> Result<()> {
    let params = load_params(params)?;
    let candles = load_csv(csv, timeframe)?;
    let as_of = match as_of {
        Some(s) => parse_time(s)?,
        None => Utc::now(),
    };
    let eval: Evaluation = evaluate_window(&params, timeframe, &candles, as_of)?;
    print_json(&eval)
}

fn run_params_check(path: Option<&Path>) -> Result<()> {
    let params = load_params(path)?;
    println!("hash:   {}", params.full_hash());
    println!("warmup: {} candles", params.warmup());
    Ok(())
}

fn run_synth(
    symbol: &str,
    count: usize,
    timeframe: Timeframe,
    start: &str,
    out: Option<&Path>,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be positive");
    }
    let candles = generate_synthetic_candles(symbol, parse_time(start)?, count, timeframe);
    match out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_candles(file, &candles)?;
            info!(symbol, count, path = %path.display(), "synthetic series written");
        }
        None => write_candles(std::io::stdout().lock(), &candles)?,
    }
    Ok(())
}
