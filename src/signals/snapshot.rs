// =============================================================================
// Indicator Snapshot
// =============================================================================
//
// Latest values of every indicator the decision engine reads, plus the prior
// bar's values for the crossover pair.  Derived fresh from each series and
// never stored on its own.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EngineError, Result};
use crate::indicators::{
    calculate_demarker, calculate_macd, calculate_rsi, calculate_sma, calculate_volume_oscillator,
    calculate_wma, latest, previous,
};
use crate::market_data::Series;
use crate::runtime_config::IndicatorParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    /// Long trend SMA (100 by default).
    pub sma_trend: f64,
    /// Fast SMA of the crossover pair, now and one bar earlier.
    pub sma_fast: f64,
    pub sma_fast_prev: f64,
    /// WMA of the crossover pair, now and one bar earlier.
    pub wma: f64,
    pub wma_prev: f64,
    pub rsi: f64,
    /// `None` when neither highs nor lows moved over the window.
    pub demarker: Option<f64>,
    /// `None` when the long volume average is zero.
    pub volume_oscillator: Option<f64>,
    /// MACD histogram; informational only.
    pub macd_histogram: Option<f64>,
}

impl IndicatorSnapshot {
    /// Compute the snapshot at the newest bar of `series`.
    ///
    /// Fails with `InsufficientData` when the series is shorter than the
    /// indicator lookback.
    pub fn compute(series: &Series, params: &IndicatorParams) -> Result<Self> {
        let required = params.lookback();
        let available = series.len();
        if available < required {
            return Err(EngineError::insufficient(required, available));
        }
        let short = |period: usize| EngineError::insufficient(period, available);

        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let sma_fast = calculate_sma(&closes, params.sma_fast);
        let wma = calculate_wma(&closes, params.wma_period);

        let snapshot = Self {
            price: series.last_close().ok_or_else(|| short(required))?,
            sma_trend: latest(&calculate_sma(&closes, params.sma_trend))
                .ok_or_else(|| short(params.sma_trend))?,
            sma_fast: latest(&sma_fast).ok_or_else(|| short(params.sma_fast))?,
            sma_fast_prev: previous(&sma_fast).ok_or_else(|| short(params.sma_fast + 1))?,
            wma: latest(&wma).ok_or_else(|| short(params.wma_period))?,
            wma_prev: previous(&wma).ok_or_else(|| short(params.wma_period + 1))?,
            rsi: latest(&calculate_rsi(&closes, params.rsi_period))
                .ok_or_else(|| short(params.rsi_period + 1))?,
            demarker: latest(&calculate_demarker(&highs, &lows, params.demarker_period)),
            volume_oscillator: latest(&calculate_volume_oscillator(
                &volumes,
                params.volume_short,
                params.volume_long,
            )),
            macd_histogram: latest(&calculate_macd(&closes).histogram),
        };

        trace!(?snapshot, "indicator snapshot");
        Ok(snapshot)
    }

    /// Fast SMA moved from at-or-below the WMA to above it on this bar.
    pub fn crossed_above(&self) -> bool {
        self.sma_fast_prev <= self.wma_prev && self.sma_fast > self.wma
    }

    /// Fast SMA moved from at-or-above the WMA to below it on this bar.
    pub fn crossed_below(&self) -> bool {
        self.sma_fast_prev >= self.wma_prev && self.sma_fast < self.wma
    }

    /// Signed distance of price from the trend SMA, in percent.
    pub fn trend_distance_pct(&self) -> f64 {
        (self.price - self.sma_trend) / self.sma_trend * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn ramp(len: usize) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::from_bars(
            len,
            (0..len).map(|i| {
                let c = 100.0 + 0.1 * i as f64;
                Bar {
                    timestamp: start + Duration::minutes(i as i64),
                    open: c,
                    high: c + 0.2,
                    low: c - 0.2,
                    close: c,
                    volume: 1_000.0,
                }
            }),
        )
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = IndicatorSnapshot::compute(&ramp(99), &IndicatorParams::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData {
                required: 100,
                available: 99
            }
        ));
    }

    #[test]
    fn ramp_snapshot_values() {
        let snap = IndicatorSnapshot::compute(&ramp(120), &IndicatorParams::default()).unwrap();
        assert!((snap.price - 111.9).abs() < 1e-9);
        // SMA-100 of 100.0 + 0.1*i for i in 20..120 is the midpoint 106.95.
        assert!((snap.sma_trend - 106.95).abs() < 1e-9);
        assert!((snap.sma_fast - snap.sma_fast_prev - 0.1).abs() < 1e-9);
        assert!((snap.rsi - 100.0).abs() < 1e-9);
        assert_eq!(snap.demarker, Some(1.0));
        assert_eq!(snap.volume_oscillator, Some(0.0));
        assert!(snap.macd_histogram.is_some());
        // Steady ramp: SMA-10 lags less than WMA-25, no fresh cross.
        assert!(snap.sma_fast > snap.wma);
        assert!(!snap.crossed_above());
        assert!(!snap.crossed_below());
    }

    #[test]
    fn crossover_predicates() {
        let mut snap = IndicatorSnapshot::compute(&ramp(120), &IndicatorParams::default()).unwrap();
        snap.sma_fast_prev = 1.0;
        snap.wma_prev = 1.0;
        snap.sma_fast = 1.1;
        snap.wma = 1.0;
        assert!(snap.crossed_above());
        snap.sma_fast = 0.9;
        assert!(snap.crossed_below());
        snap.sma_fast = 1.0;
        assert!(!snap.crossed_above());
        assert!(!snap.crossed_below());
    }

    #[test]
    fn trend_distance() {
        let mut snap = IndicatorSnapshot::compute(&ramp(120), &IndicatorParams::default()).unwrap();
        snap.price = 101.0;
        snap.sma_trend = 100.0;
        assert!((snap.trend_distance_pct() - 1.0).abs() < 1e-9);
    }
}
