// =============================================================================
// Engine Configuration: JSON settings with atomic save
// =============================================================================
//
// Every tunable of the signal engine lives here: indicator periods, lookback,
// validity window, and the scan concurrency policy.  All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::instruments;
use crate::regime::{ConditionWindows, MIN_CONDITION_BARS};
use crate::types::Confidence;

/// Minimum series length for any signal to be issued.
pub const MIN_SIGNAL_BARS: usize = 100;

/// Longest accepted signal validity window (one day).
pub const MAX_VALIDITY_SECS: i64 = 86_400;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_lookback_bars() -> usize {
    500
}

fn default_min_bars() -> usize {
    MIN_SIGNAL_BARS
}

fn default_timeframe() -> String {
    "1m".to_string()
}

fn default_validity_secs() -> i64 {
    60
}

fn default_max_concurrent_evaluations() -> usize {
    4
}

fn default_level_proximity_pct() -> f64 {
    1.0
}

fn default_instruments() -> Vec<String> {
    instruments::all().map(|i| i.id.to_string()).collect()
}

fn default_sma_fast() -> usize {
    10
}

fn default_wma_period() -> usize {
    25
}

fn default_sma_trend() -> usize {
    100
}

fn default_rsi_period() -> usize {
    14
}

fn default_demarker_period() -> usize {
    14
}

fn default_volume_short() -> usize {
    5
}

fn default_volume_long() -> usize {
    10
}

fn default_sr_window() -> usize {
    20
}

fn default_trend_fast() -> usize {
    20
}

fn default_trend_slow() -> usize {
    50
}

fn default_volatility_window() -> usize {
    20
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Periods for every indicator the decision engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Fast SMA in the crossover pair.
    #[serde(default = "default_sma_fast")]
    pub sma_fast: usize,

    /// WMA in the crossover pair.
    #[serde(default = "default_wma_period")]
    pub wma_period: usize,

    /// Long SMA that gates the trend side of a call.
    #[serde(default = "default_sma_trend")]
    pub sma_trend: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_demarker_period")]
    pub demarker_period: usize,

    #[serde(default = "default_volume_short")]
    pub volume_short: usize,

    #[serde(default = "default_volume_long")]
    pub volume_long: usize,

    /// Half-width of the pivot window for support/resistance.
    #[serde(default = "default_sr_window")]
    pub sr_window: usize,

    /// Market-condition trend SMAs.
    #[serde(default = "default_trend_fast")]
    pub trend_fast: usize,

    #[serde(default = "default_trend_slow")]
    pub trend_slow: usize,

    /// Bars in the volatility range window.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_fast: default_sma_fast(),
            wma_period: default_wma_period(),
            sma_trend: default_sma_trend(),
            rsi_period: default_rsi_period(),
            demarker_period: default_demarker_period(),
            volume_short: default_volume_short(),
            volume_long: default_volume_long(),
            sr_window: default_sr_window(),
            trend_fast: default_trend_fast(),
            trend_slow: default_trend_slow(),
            volatility_window: default_volatility_window(),
        }
    }
}

impl IndicatorParams {
    /// Bars needed before every indicator has a current and a previous value.
    pub fn lookback(&self) -> usize {
        [
            self.sma_trend,
            self.sma_fast + 1,
            self.wma_period + 1,
            self.rsi_period + 1,
            self.demarker_period + 1,
            self.volume_long,
            self.trend_slow,
        ]
        .into_iter()
        .max()
        .unwrap_or(MIN_SIGNAL_BARS)
    }

    pub fn condition_windows(&self) -> ConditionWindows {
        ConditionWindows {
            trend_fast: self.trend_fast,
            trend_slow: self.trend_slow,
            volatility: self.volatility_window,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the signal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bars requested from the data feed per evaluation.
    #[serde(default = "default_lookback_bars")]
    pub lookback_bars: usize,

    /// Below this many bars no signal is ever issued.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,

    /// Bar timeframe requested from the feed (e.g. "1m").
    #[serde(default = "default_timeframe")]
    pub timeframe: String,

    /// How long a signal stays actionable after generation.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: i64,

    /// Upper bound on evaluations running at once during a scan.
    #[serde(default = "default_max_concurrent_evaluations")]
    pub max_concurrent_evaluations: usize,

    /// Scans drop signals below this tier.  `evaluate` ignores it.
    #[serde(default)]
    pub min_confidence: Confidence,

    /// Distance, in percent of price, that counts as "near" a level.
    #[serde(default = "default_level_proximity_pct")]
    pub level_proximity_pct: f64,

    /// Instrument ids scanned by default.
    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,

    #[serde(default)]
    pub indicators: IndicatorParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_bars: default_lookback_bars(),
            min_bars: default_min_bars(),
            timeframe: default_timeframe(),
            validity_secs: default_validity_secs(),
            max_concurrent_evaluations: default_max_concurrent_evaluations(),
            min_confidence: Confidence::default(),
            level_proximity_pct: default_level_proximity_pct(),
            instruments: default_instruments(),
            indicators: IndicatorParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("rejected engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            instruments = config.instruments.len(),
            timeframe = %config.timeframe,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<(), EngineError> {
        let p = &self.indicators;
        let periods = [
            ("sma_fast", p.sma_fast),
            ("wma_period", p.wma_period),
            ("sma_trend", p.sma_trend),
            ("rsi_period", p.rsi_period),
            ("demarker_period", p.demarker_period),
            ("volume_short", p.volume_short),
            ("volume_long", p.volume_long),
            ("sr_window", p.sr_window),
            ("trend_fast", p.trend_fast),
            ("trend_slow", p.trend_slow),
            ("volatility_window", p.volatility_window),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, v)| *v == 0) {
            return Err(EngineError::Config(format!("{name} must be positive")));
        }
        if p.volume_short >= p.volume_long {
            return Err(EngineError::Config(
                "volume_short must be shorter than volume_long".into(),
            ));
        }
        if self.min_bars < MIN_SIGNAL_BARS {
            return Err(EngineError::Config(format!(
                "min_bars must be at least {MIN_SIGNAL_BARS}"
            )));
        }
        if self.min_bars < MIN_CONDITION_BARS.max(p.lookback()) {
            return Err(EngineError::Config(format!(
                "min_bars {} is shorter than the indicator lookback {}",
                self.min_bars,
                p.lookback()
            )));
        }
        if self.lookback_bars < self.min_bars {
            return Err(EngineError::Config(format!(
                "lookback_bars {} is below min_bars {}",
                self.lookback_bars, self.min_bars
            )));
        }
        if self.validity_secs <= 0 {
            return Err(EngineError::Config("validity_secs must be positive".into()));
        }
        if self.validity_secs > MAX_VALIDITY_SECS {
            return Err(EngineError::Config(format!(
                "validity_secs {} exceeds {MAX_VALIDITY_SECS}",
                self.validity_secs
            )));
        }
        if self.max_concurrent_evaluations == 0 {
            return Err(EngineError::Config(
                "max_concurrent_evaluations must be positive".into(),
            ));
        }
        if !(self.level_proximity_pct.is_finite() && self.level_proximity_pct >= 0.0) {
            return Err(EngineError::Config(
                "level_proximity_pct must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}
