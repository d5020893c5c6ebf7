//! The indicator bank: one instance of every indicator, fed candle by candle.
//!
//! `push` advances every component on every candle, whether or not the
//! others have warmed up, so a snapshot at index i depends only on candles
//! 0..=i. A snapshot exists only when every field is defined.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::error::EngineError;
use crate::params::ParamSet;

use super::{
    Adx, Bollinger, Ema, Indicator, Macd, Rsi, Sma, Supertrend, TrendDirection,
};

/// Rolling average volume period.
pub const VOLUME_SMA_PERIOD: usize = 20;

/// Every indicator value for one closed candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
    pub supertrend: f64,
    pub supertrend_direction: TrendDirection,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_mid: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    pub volume_sma: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorBank {
    ema_fast: Ema,
    ema_slow: Ema,
    ema_trend: Ema,
    adx: Adx,
    supertrend: Supertrend,
    macd: Macd,
    rsi: Rsi,
    bollinger: Bollinger,
    volume: Sma,
    warmup: usize,
    seen: usize,
}

impl IndicatorBank {
    /// Build a bank for `params`. Out-of-bound parameters are rejected here,
    /// before any indicator sees a zero or oversized period.
    pub fn new(params: &ParamSet) -> Result<Self, EngineError> {
        params.validate()?;

        let ema_fast = Ema::new(params.ema_fast_period as usize);
        let ema_slow = Ema::new(params.ema_slow_period as usize);
        let ema_trend = Ema::new(params.ema_trend_period as usize);
        let adx = Adx::new(params.adx_period as usize);
        let supertrend = Supertrend::new(
            params.supertrend_period as usize,
            params.supertrend_multiplier,
        );
        let macd = Macd::new(
            params.macd_fast as usize,
            params.macd_slow as usize,
            params.macd_signal as usize,
        );
        let rsi = Rsi::new(params.rsi_period as usize);
        let bollinger = Bollinger::new(params.bb_period as usize, params.bb_std);
        let volume = Sma::new(VOLUME_SMA_PERIOD);

        let warmup = [
            ema_fast.warmup(),
            ema_slow.warmup(),
            ema_trend.warmup(),
            adx.warmup(),
            supertrend.warmup(),
            macd.warmup(),
            rsi.warmup(),
            bollinger.warmup(),
            volume.warmup(),
        ]
        .into_iter()
        .max()
        .unwrap_or(VOLUME_SMA_PERIOD);

        Ok(Self {
            ema_fast,
            ema_slow,
            ema_trend,
            adx,
            supertrend,
            macd,
            rsi,
            bollinger,
            volume,
            warmup,
            seen: 0,
        })
    }

    /// Candles required before the first snapshot.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn candles_seen(&self) -> usize {
        self.seen
    }

    /// Feed the next closed candle.
    pub fn push(&mut self, candle: &Candle) -> Option<IndicatorSnapshot> {
        self.seen += 1;

        let ema_fast = self.ema_fast.next(candle);
        let ema_slow = self.ema_slow.next(candle);
        let ema_trend = self.ema_trend.next(candle);
        let adx = self.adx.next(candle);
        let supertrend = self.supertrend.next(candle);
        let macd = self.macd.next(candle);
        let rsi = self.rsi.next(candle);
        let bb = self.bollinger.next(candle);
        let volume_sma = self.volume.update(candle.volume);

        let (adx, supertrend, macd, bb) = (adx?, supertrend?, macd?, bb?);
        Some(IndicatorSnapshot {
            ema_fast: ema_fast?,
            ema_slow: ema_slow?,
            ema_trend: ema_trend?,
            adx: adx.adx,
            di_plus: adx.di_plus,
            di_minus: adx.di_minus,
            supertrend: supertrend.value,
            supertrend_direction: supertrend.direction,
            macd_line: macd.line,
            macd_signal: macd.signal,
            macd_hist: macd.hist,
            rsi: rsi?,
            bb_upper: bb.upper,
            bb_mid: bb.mid,
            bb_lower: bb.lower,
            bb_width: bb.width(),
            volume_sma: volume_sma?,
        })
    }

    /// Run a fresh bank over a series, one slot per candle.
    pub fn compute(
        params: &ParamSet,
        candles: &[Candle],
    ) -> Result<Vec<Option<IndicatorSnapshot>>, EngineError> {
        let mut bank = Self::new(params)?;
        Ok(candles.iter().map(|c| bank.push(c)).collect())
    }

    /// Like `compute`, but a series shorter than the warmup is an error.
    pub fn compute_checked(
        params: &ParamSet,
        candles: &[Candle],
    ) -> Result<Vec<Option<IndicatorSnapshot>>, EngineError> {
        let mut bank = Self::new(params)?;
        let need = bank.warmup();
        if candles.len() < need {
            return Err(EngineError::InsufficientData {
                have: candles.len(),
                need,
            });
        }
        Ok(candles.iter().map(|c| bank.push(c)).collect())
    }
}
