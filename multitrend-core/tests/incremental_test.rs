//! Incremental vs batch equality.
//!
//! Streaming candles through one long-lived engine must give exactly what a
//! fresh engine computes over the window ending at the same candle, and what
//! `IndicatorBank::compute` produces for the whole series.

use chrono::{TimeZone, Utc};
use multitrend_core::indicators::IndicatorBank;
use multitrend_core::{
    evaluate_window, Candle, CandleWindow, EngineError, ParamSet, SignalEngine, Timeframe,
};

fn make_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 200.0 + x * 0.15 + (x * 0.21).sin() * 4.0 + (x * 0.05).cos() * 6.0;
            let open = close - (x * 0.9).sin();
            Candle::new(
                base + chrono::Duration::minutes(5 * i as i64),
                open,
                open.max(close) + 0.8,
                open.min(close) - 0.8,
                close,
                900.0 + (x * 1.3).sin().abs() * 400.0,
            )
        })
        .collect()
}

#[test]
fn streaming_matches_stateless_window() {
    let params = ParamSet::default();
    let tf = Timeframe::default();
    let candles = make_candles(180);

    let mut engine = SignalEngine::new(params.clone(), tf).unwrap();
    for (i, candle) in candles.iter().enumerate() {
        let streamed = engine.on_candle(*candle);
        let as_of = candle.close_time(tf);
        let batch = evaluate_window(&params, tf, &candles[..=i], as_of);
        match (streamed, batch) {
            (Ok(s), Ok(b)) => assert_eq!(s, b, "mismatch at candle {i}"),
            (Err(EngineError::InsufficientData { .. }), Err(EngineError::InsufficientData { .. })) => {}
            (s, b) => panic!("divergence at candle {i}: streamed {s:?}, batch {b:?}"),
        }
    }
}

#[test]
fn engine_snapshots_match_bank_compute() {
    let params = ParamSet::default();
    let candles = make_candles(200);
    let batch = IndicatorBank::compute(&params, &candles).unwrap();

    let mut engine = SignalEngine::new(params, Timeframe::default()).unwrap();
    let evals = engine.replay(&candles).unwrap();
    let from_batch: Vec<_> = batch.into_iter().flatten().collect();
    let streamed: Vec<_> = evals.iter().map(|e| e.snapshot).collect();
    assert_eq!(streamed, from_batch);
}

#[test]
fn window_feeds_engine() {
    let params = ParamSet::default();
    let tf = Timeframe::default();
    let candles = make_candles(150);

    let mut window = CandleWindow::for_params(&params, tf);
    for c in &candles {
        window.push(*c).unwrap();
    }
    assert_eq!(window.len(), window.capacity());

    // The window holds warmup + margin candles, enough for a fresh evaluation
    let held = window.to_vec();
    let as_of = held.last().unwrap().close_time(tf);
    let eval = evaluate_window(&params, tf, &held, as_of).unwrap();
    assert_eq!(eval.timestamp, candles.last().unwrap().timestamp);
}

#[test]
fn bank_compute_checked_reports_shortfall() {
    let params = ParamSet::default();
    let candles = make_candles(99);
    match IndicatorBank::compute_checked(&params, &candles) {
        Err(EngineError::InsufficientData { have, need }) => {
            assert_eq!(have, 99);
            assert_eq!(need, 100);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}
