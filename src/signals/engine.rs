// =============================================================================
// Signal Decision Engine
// =============================================================================
//
// One stateless evaluation per call:
//   1. LOW volatility regime            -> no signal (market filter)
//   2. bullish gate holds               -> UP
//   3. else bearish gate holds          -> DOWN
//   4. neither                          -> no signal
//   5. score the secondary criteria     -> confidence tier
//   6. describe the satisfied gate      -> rationale
//   7. stamp the validity window
//   8. note a nearby support/resistance level (support wins)
//
// A failed gate is a legitimate "no signal", never an error.  Construction
// rejects an unrepresentable validity window; evaluation only fails with
// InsufficientData.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, trace, warn};

use crate::error::{EngineError, Result};
use crate::indicators::{detect_levels, nearest_level, SupportResistance};
use crate::market_data::Series;
use crate::regime::{classify_market_with, MarketCondition, VolatilityRegime};
use crate::runtime_config::{EngineConfig, IndicatorParams};
use crate::types::{Confidence, Direction, Signal};

use super::snapshot::IndicatorSnapshot;

const RSI_FLOOR: f64 = 30.0;
const RSI_CEILING: f64 = 70.0;
const RSI_BALANCED: (f64, f64) = (40.0, 60.0);
const DEMARKER_BULL_GATE: f64 = 0.3;
const DEMARKER_BEAR_GATE: f64 = 0.7;
const DEMARKER_MIDLINE: f64 = 0.5;
const STRONG_VOLUME: f64 = 5.0;
/// Fractional distance beyond the trend SMA that counts as a strong trend.
const STRONG_TREND: f64 = 0.005;

pub struct SignalEngine {
    params: IndicatorParams,
    min_bars: usize,
    validity: Duration,
    level_proximity_pct: f64,
}

impl SignalEngine {
    /// Fails with `Config` when `validity_secs` is not a representable
    /// duration.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let validity = Duration::try_seconds(config.validity_secs).ok_or_else(|| {
            EngineError::Config(format!(
                "validity_secs {} is out of range",
                config.validity_secs
            ))
        })?;
        Ok(Self {
            params: config.indicators.clone(),
            min_bars: config.min_bars,
            validity,
            level_proximity_pct: config.level_proximity_pct,
        })
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    /// Run the whole pipeline over `series` as of `now`.
    ///
    /// `Err(InsufficientData)` when the series is shorter than `min_bars`;
    /// `Ok(None)` when no call qualifies.
    pub fn evaluate_series(
        &self,
        instrument_id: &str,
        series: &Series,
        now: DateTime<Utc>,
    ) -> Result<Option<Signal>> {
        if series.len() < self.min_bars {
            return Err(EngineError::insufficient(self.min_bars, series.len()));
        }

        let condition = classify_market_with(series, self.params.condition_windows())?;
        if condition.volatility_regime == VolatilityRegime::Low {
            debug!(
                instrument = instrument_id,
                volatility = format!("{:.4}", condition.volatility),
                "low volatility, skipped"
            );
            return Ok(None);
        }

        let snapshot = IndicatorSnapshot::compute(series, &self.params)?;
        let Some(mut signal) = self.decide(instrument_id, &snapshot, &condition, now) else {
            return Ok(None);
        };

        let levels = detect_levels(&series.highs(), &series.lows(), self.params.sr_window);
        signal.level_note = level_note(&levels, snapshot.price, self.level_proximity_pct);

        info!(
            instrument = instrument_id,
            direction = %signal.direction,
            confidence = %signal.confidence,
            trend = %condition.trend,
            "signal generated"
        );
        Ok(Some(signal))
    }

    /// Steps 1 to 7 over precomputed inputs.  Pure apart from logging.
    pub fn decide(
        &self,
        instrument_id: &str,
        snapshot: &IndicatorSnapshot,
        condition: &MarketCondition,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        if condition.volatility_regime == VolatilityRegime::Low {
            return None;
        }

        let direction = if bullish_gate(snapshot) {
            Direction::Up
        } else if bearish_gate(snapshot) {
            Direction::Down
        } else {
            trace!(
                instrument = instrument_id,
                rsi = snapshot.rsi,
                demarker = ?snapshot.demarker,
                volume_oscillator = ?snapshot.volume_oscillator,
                "no condition set satisfied"
            );
            return None;
        };

        let Some(valid_until) = now.checked_add_signed(self.validity) else {
            warn!(instrument = instrument_id, %now, "validity window overflows, dropped");
            return None;
        };

        let score = score_confidence(direction, snapshot);
        let confidence = Confidence::from_score(score);
        debug!(
            instrument = instrument_id,
            %direction,
            score,
            %confidence,
            trend_distance_pct = format!("{:.3}", snapshot.trend_distance_pct()),
            "gate passed"
        );

        Some(Signal {
            instrument_id: instrument_id.to_string(),
            direction,
            confidence,
            generated_at: now,
            valid_until,
            rationale: self.rationale(direction, snapshot),
            level_note: None,
        })
    }

    fn rationale(&self, direction: Direction, snap: &IndicatorSnapshot) -> Vec<String> {
        let p = &self.params;
        let demarker = snap.demarker.unwrap_or(DEMARKER_MIDLINE);
        match direction {
            Direction::Up => vec![
                format!("Price above SMA {} (Bullish trend)", p.sma_trend),
                format!("SMA {} crossed above WMA {}", p.sma_fast, p.wma_period),
                format!("RSI at {:.1} (Momentum)", snap.rsi),
                format!("DeMarker at {demarker:.2} (Bullish)"),
                "High volume confirmation".to_string(),
            ],
            Direction::Down => vec![
                format!("Price below SMA {} (Bearish trend)", p.sma_trend),
                format!("SMA {} crossed below WMA {}", p.sma_fast, p.wma_period),
                format!("RSI at {:.1} (Momentum)", snap.rsi),
                format!("DeMarker at {demarker:.2} (Bearish)"),
                "High volume confirmation".to_string(),
            ],
        }
    }
}

fn rsi_in_range(rsi: f64) -> bool {
    rsi > RSI_FLOOR && rsi < RSI_CEILING
}

fn volume_confirms(snap: &IndicatorSnapshot) -> bool {
    snap.volume_oscillator.is_some_and(|v| v > 0.0)
}

fn bullish_gate(snap: &IndicatorSnapshot) -> bool {
    snap.price > snap.sma_trend
        && snap.crossed_above()
        && rsi_in_range(snap.rsi)
        && snap.demarker.is_some_and(|d| d > DEMARKER_BULL_GATE)
        && volume_confirms(snap)
}

fn bearish_gate(snap: &IndicatorSnapshot) -> bool {
    snap.price < snap.sma_trend
        && snap.crossed_below()
        && rsi_in_range(snap.rsi)
        && snap.demarker.is_some_and(|d| d < DEMARKER_BEAR_GATE)
        && volume_confirms(snap)
}

/// Count of satisfied secondary criteria (0..=4) for `direction`.
pub fn score_confidence(direction: Direction, snap: &IndicatorSnapshot) -> u8 {
    let (lo, hi) = RSI_BALANCED;
    let balanced_rsi = (lo..=hi).contains(&snap.rsi);
    let strong_volume = snap.volume_oscillator.is_some_and(|v| v > STRONG_VOLUME);
    let (demarker_agrees, strong_trend) = match direction {
        Direction::Up => (
            snap.demarker.is_some_and(|d| d > DEMARKER_MIDLINE),
            snap.price >= snap.sma_trend * (1.0 + STRONG_TREND),
        ),
        Direction::Down => (
            snap.demarker.is_some_and(|d| d < DEMARKER_MIDLINE),
            snap.price <= snap.sma_trend * (1.0 - STRONG_TREND),
        ),
    };

    [balanced_rsi, demarker_agrees, strong_volume, strong_trend]
        .into_iter()
        .filter(|&hit| hit)
        .count() as u8
}

/// Proximity note for the nearest level within `proximity_pct` of `price`.
/// Resistance is checked first; a qualifying support replaces it.
pub fn level_note(levels: &SupportResistance, price: f64, proximity_pct: f64) -> Option<String> {
    let near = |level: &f64| (level - price).abs() / price * 100.0 < proximity_pct;

    let mut note = nearest_level(&levels.resistance, price)
        .filter(near)
        .map(|level| format!("Near Resistance at {level:.4}"));
    if let Some(level) = nearest_level(&levels.support, price).filter(near) {
        note = Some(format!("Near Support at {level:.4}"));
    }
    note
}
