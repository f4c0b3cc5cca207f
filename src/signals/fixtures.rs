//! Deterministic series shared by the engine and service tests.
//!
//! Every bar opens at the previous close and its wicks extend `wick` beyond
//! the body, so all fixtures are well-formed OHLC.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::market_data::{Bar, Series};

pub const BARS: usize = 150;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn series(closes: &[f64], volumes: &[f64], wick: f64) -> Series {
    let start = start();
    let mut open = closes[0];
    let bars: Vec<Bar> = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let bar = Bar {
                timestamp: start + Duration::minutes(i as i64),
                open,
                high: open.max(close) + wick,
                low: open.min(close) - wick,
                close,
                volume,
            };
            open = close;
            bar
        })
        .collect();
    Series::from_bars(BARS, bars)
}

/// Drifting sine wave of closes.
fn wave(drift: f64, amplitude: f64, period: f64, phase: f64) -> Vec<f64> {
    (0..BARS)
        .map(|i| {
            let x = i as f64;
            100.0 + drift * x + amplitude * (2.0 * PI * x / period + phase).sin()
        })
        .collect()
}

/// Flat volume that steps up to `last` over the final five bars.
fn volume_step(last: f64) -> Vec<f64> {
    (0..BARS)
        .map(|i| if i >= BARS - 5 { last } else { 1_000.0 })
        .collect()
}

fn rising_wave() -> Vec<f64> {
    wave(0.005, 1.2, 16.0, 0.4)
}

/// 150 bars ending in a bullish crossover: price about 1% above SMA-100,
/// RSI near 59.5, DeMarker near 0.62, volume oscillator near 8.3.
pub fn bullish() -> Series {
    series(&rising_wave(), &volume_step(1_180.0), 0.3)
}

/// Price mirror of [`bullish`] around 100: a bearish crossover with RSI near
/// 40.5 and DeMarker near 0.38.
pub fn bearish() -> Series {
    let closes: Vec<f64> = rising_wave().iter().map(|c| 200.0 - c).collect();
    series(&closes, &volume_step(1_180.0), 0.3)
}

/// Bullish crossover that only meets two secondary criteria: RSI near 67.7
/// and volume oscillator near 2.4.  Price sits 0.3% under a resistance pivot
/// at 101.4968.
pub fn modest_bullish() -> Series {
    series(&wave(0.0, 1.2, 20.0, 5.1), &volume_step(1_050.0), 0.3)
}

/// Closes wobbling within 0.2% of 100 on narrow bars: low volatility.
pub fn flat() -> Series {
    let closes: Vec<f64> = (0..BARS).map(|i| 100.0 + 0.2 * (i as f64).sin()).collect();
    series(&closes, &volume_step(1_000.0), 0.05)
}

#[test]
fn fixture_bars_are_well_formed() {
    for (name, series) in [
        ("bullish", bullish()),
        ("bearish", bearish()),
        ("modest_bullish", modest_bullish()),
        ("flat", flat()),
    ] {
        assert_eq!(series.len(), BARS, "{name}");
        for bar in series.bars() {
            assert!(bar.low <= bar.open.min(bar.close), "{name}: {bar:?}");
            assert!(bar.high >= bar.open.max(bar.close), "{name}: {bar:?}");
        }
    }
}
