// =============================================================================
// Market Condition Classifier
// =============================================================================
//
// Derives the trend direction and volatility regime of a series.
//
//   Trend (P = latest close):
//     UPTREND: P > SMA(20) > SMA(50)
//     DOWNTREND: P < SMA(20) < SMA(50)
//     SIDEWAYS: anything else
//
//   Volatility over the newest 20 bars:
//     volatility = (max(high) - min(low)) / P
//     LOW < 1%  <=  NORMAL  <=  5% < HIGH
//
// A LOW regime is the engine's market filter: no signal is issued into it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::indicators::{calculate_sma, latest};
use crate::market_data::Series;

/// Bars required before a condition can be classified.
pub const MIN_CONDITION_BARS: usize = 50;

const LOW_VOLATILITY: f64 = 0.01;
const HIGH_VOLATILITY: f64 = 0.05;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptrend => write!(f, "UPTREND"),
            Self::Downtrend => write!(f, "DOWNTREND"),
            Self::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

impl VolatilityRegime {
    fn from_volatility(volatility: f64) -> Self {
        if volatility < LOW_VOLATILITY {
            Self::Low
        } else if volatility > HIGH_VOLATILITY {
            Self::High
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Normal => write!(f, "NORMAL"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Snapshot of the market state at the newest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCondition {
    pub trend: Trend,
    pub volatility_regime: VolatilityRegime,
    /// Range of the newest bars relative to the latest close.
    pub volatility: f64,
    pub current_price: f64,
}

/// Lookback windows for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionWindows {
    pub trend_fast: usize,
    pub trend_slow: usize,
    pub volatility: usize,
}

impl Default for ConditionWindows {
    fn default() -> Self {
        Self {
            trend_fast: 20,
            trend_slow: MIN_CONDITION_BARS,
            volatility: 20,
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Classify `series` with the default 20/50/20 windows.
pub fn classify_market(series: &Series) -> Result<MarketCondition> {
    classify_market_with(series, ConditionWindows::default())
}

/// Classify `series` with explicit windows.
///
/// Fails with `InsufficientData` when the series is shorter than the slow
/// trend window (and never shorter than [`MIN_CONDITION_BARS`]).
pub fn classify_market_with(series: &Series, windows: ConditionWindows) -> Result<MarketCondition> {
    let required = windows
        .trend_slow
        .max(windows.trend_fast)
        .max(windows.volatility)
        .max(MIN_CONDITION_BARS);
    if series.len() < required {
        return Err(EngineError::insufficient(required, series.len()));
    }

    let closes = series.closes();
    let available = series.len();
    let current_price = series
        .last_close()
        .ok_or_else(|| EngineError::insufficient(required, available))?;
    let fast = latest(&calculate_sma(&closes, windows.trend_fast))
        .ok_or_else(|| EngineError::insufficient(windows.trend_fast, available))?;
    let slow = latest(&calculate_sma(&closes, windows.trend_slow))
        .ok_or_else(|| EngineError::insufficient(windows.trend_slow, available))?;

    let trend = classify_trend(current_price, fast, slow);

    let recent = series.tail(windows.volatility);
    let max_high = recent.highs().into_iter().fold(f64::NEG_INFINITY, f64::max);
    let min_low = recent.lows().into_iter().fold(f64::INFINITY, f64::min);
    let volatility = (max_high - min_low) / current_price;
    let volatility_regime = VolatilityRegime::from_volatility(volatility);

    debug!(
        trend = %trend,
        regime = %volatility_regime,
        volatility = format!("{:.4}", volatility),
        price = current_price,
        "market condition classified"
    );

    Ok(MarketCondition {
        trend,
        volatility_regime,
        volatility,
        current_price,
    })
}

fn classify_trend(price: f64, fast: f64, slow: f64) -> Trend {
    if price > fast && fast > slow {
        Trend::Uptrend
    } else if price < fast && fast < slow {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}
