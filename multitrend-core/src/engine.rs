//! Per-symbol evaluation pipeline.
//!
//! candle -> indicator bank -> confluence scorer -> {signal generator, risk}
//!
//! A `SignalEngine` owns the only state that survives between candles: the
//! indicator bank and the previous candle/snapshot pair. One engine per
//! symbol; engines share nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{check_next, Candle, Side, Timeframe};
use crate::error::EngineError;
use crate::indicators::{IndicatorBank, IndicatorSnapshot};
use crate::params::ParamSet;
use crate::risk::RiskParameters;
use crate::scoring::{score, ConfluenceResult};
use crate::signals::{generate, SignalDecision};

/// Everything the engine concluded about one closed candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Open time of the evaluated candle.
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub snapshot: IndicatorSnapshot,
    pub confluence: ConfluenceResult,
    pub decision: SignalDecision,
    /// Present only when an entry flag is set.
    pub risk: Option<RiskParameters>,
}

impl Evaluation {
    /// Risk for a trade already open on `side`, re-derived from this candle's
    /// strength on that side.
    pub fn risk_for_open_trade(&self, side: Side) -> RiskParameters {
        RiskParameters::for_open_trade(self.confluence.strength_for(side))
    }
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    params: ParamSet,
    timeframe: Timeframe,
    bank: IndicatorBank,
    last_candle: Option<Candle>,
    last_snapshot: Option<IndicatorSnapshot>,
}

impl SignalEngine {
    /// Build an engine. Parameters are validated here, never clamped.
    pub fn new(params: ParamSet, timeframe: Timeframe) -> Result<Self, EngineError> {
        Ok(Self {
            bank: IndicatorBank::new(&params)?,
            params,
            timeframe,
            last_candle: None,
            last_snapshot: None,
        })
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn warmup(&self) -> usize {
        self.bank.warmup()
    }

    /// Feed the next closed candle.
    ///
    /// Returns `InvalidInput` (engine state untouched) for a candle that cannot
    /// follow the previous one, and `InsufficientData` while warming up.
    pub fn on_candle(&mut self, candle: Candle) -> Result<Evaluation, EngineError> {
        check_next(self.last_candle.as_ref(), &candle, self.timeframe)?;
        self.last_candle = Some(candle);

        let current = self.bank.push(&candle);
        let previous = std::mem::replace(&mut self.last_snapshot, current);
        let Some(snapshot) = current else {
            return Err(EngineError::InsufficientData {
                have: self.bank.candles_seen(),
                need: self.bank.warmup(),
            });
        };

        let confluence = score(&snapshot, previous.as_ref(), candle.close, &self.params);
        let decision = generate(&confluence, &candle, &snapshot, &self.params);
        let risk = decision
            .entry_side()
            .and_then(|side| RiskParameters::for_entry(confluence.strength_for(side)));

        trace!(
            timestamp = %candle.timestamp,
            strength = confluence.strength,
            trend_score = confluence.trend_score,
            enter_long = decision.enter_long,
            enter_short = decision.enter_short,
            exit_long = decision.exit_long,
            exit_short = decision.exit_short,
            "evaluated candle"
        );

        Ok(Evaluation {
            timestamp: candle.timestamp,
            close: candle.close,
            snapshot,
            confluence,
            decision,
            risk,
        })
    }

    /// Feed a series. Warmup candles are skipped; invalid input aborts.
    pub fn replay(&mut self, candles: &[Candle]) -> Result<Vec<Evaluation>, EngineError> {
        let mut out = Vec::with_capacity(candles.len().saturating_sub(self.warmup()));
        for candle in candles {
            match self.on_candle(*candle) {
                Ok(eval) => out.push(eval),
                Err(e) if e.is_recoverable() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}

/// Stateless batch form: evaluate the last closed candle of `candles`.
///
/// A trailing candle whose close time is after `as_of` is still forming and
/// is ignored.
pub fn evaluate_window(
    params: &ParamSet,
    timeframe: Timeframe,
    candles: &[Candle],
    as_of: DateTime<Utc>,
) -> Result<Evaluation, EngineError> {
    let closed = match candles.split_last() {
        Some((last, rest)) if last.close_time(timeframe) > as_of => rest,
        _ => candles,
    };

    let mut engine = SignalEngine::new(params.clone(), timeframe)?;
    let need = engine.warmup();
    if closed.len() < need {
        return Err(EngineError::InsufficientData {
            have: closed.len(),
            need,
        });
    }

    let mut last = Err(EngineError::InsufficientData { have: 0, need });
    for candle in closed {
        last = engine.on_candle(*candle);
        if matches!(&last, Err(e) if !e.is_recoverable()) {
            return last;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn wavy(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 * 0.1 + (i as f64 * 0.35).sin() * 2.0)
            .collect();
        make_candles(&closes)
    }

    fn tf() -> Timeframe {
        Timeframe::default()
    }

    #[test]
    fn rejects_invalid_params() {
        let params = ParamSet {
            adx_threshold: 99,
            ..ParamSet::default()
        };
        assert!(matches!(
            SignalEngine::new(params, tf()),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn warming_up_is_insufficient_data() {
        let mut engine = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        let candles = wavy(100);
        for c in &candles[..99] {
            assert!(matches!(
                engine.on_candle(*c),
                Err(EngineError::InsufficientData { need: 100, .. })
            ));
        }
        assert!(engine.on_candle(candles[99]).is_ok());
    }

    #[test]
    fn out_of_order_candle_leaves_state_untouched() {
        let mut engine = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        let candles = wavy(120);
        engine.replay(&candles[..110]).unwrap();

        let err = engine.on_candle(candles[50]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let mut fresh = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        let expected = fresh.replay(&candles).unwrap();
        let resumed = engine.replay(&candles[110..]).unwrap();
        assert_eq!(resumed, expected[expected.len() - 10..].to_vec());
    }

    #[test]
    fn replay_aborts_on_nan() {
        let mut candles = wavy(120);
        candles[105].close = f64::NAN;
        let mut engine = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        assert!(matches!(
            engine.replay(&candles),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn risk_only_with_entry() {
        let mut engine = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        for eval in engine.replay(&wavy(300)).unwrap() {
            assert_eq!(eval.risk.is_some(), eval.decision.entry_side().is_some());
        }
    }

    #[test]
    fn open_trade_risk_tracks_current_strength() {
        let mut engine = SignalEngine::new(ParamSet::default(), tf()).unwrap();
        for eval in engine.replay(&wavy(200)).unwrap() {
            let risk = eval.risk_for_open_trade(Side::Long);
            assert_eq!(risk.strength, eval.confluence.bullish_strength);
            assert!(risk.stoploss_pct <= -0.03 && risk.stoploss_pct >= -0.05);
        }
    }

    #[test]
    fn evaluate_window_drops_forming_candle() {
        let candles = wavy(130);
        let params = ParamSet::default();
        let last = candles.last().unwrap();

        // as_of inside the last candle: it is still forming
        let as_of = last.timestamp + chrono::Duration::minutes(2);
        let eval = evaluate_window(&params, tf(), &candles, as_of).unwrap();
        assert_eq!(eval.timestamp, candles[128].timestamp);

        // as_of at its close: it counts
        let as_of = last.close_time(tf());
        let eval = evaluate_window(&params, tf(), &candles, as_of).unwrap();
        assert_eq!(eval.timestamp, last.timestamp);
    }

    #[test]
    fn evaluate_window_matches_engine() {
        let candles = wavy(150);
        let params = ParamSet::default();
        let as_of = candles.last().unwrap().close_time(tf());
        let batch = evaluate_window(&params, tf(), &candles, as_of).unwrap();

        let mut engine = SignalEngine::new(params, tf()).unwrap();
        let streamed = engine.replay(&candles).unwrap();
        assert_eq!(Some(&batch), streamed.last());
    }

    #[test]
    fn evaluate_window_short_window() {
        let candles = wavy(40);
        let as_of = candles.last().unwrap().close_time(tf());
        assert_eq!(
            evaluate_window(&ParamSet::default(), tf(), &candles, as_of),
            Err(EngineError::InsufficientData { have: 40, need: 100 })
        );
    }
}
