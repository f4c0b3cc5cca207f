// =============================================================================
// Market Data Feeds
// =============================================================================
//
// The engine is agnostic to where bars come from.  `DataFeed` is the only seam:
//
//   - `SimulatedFeed` replays a deterministic synthetic walk per symbol, so the
//     same symbol always yields the same bars for a given anchor time.
//   - `BufferedFeed`  serves the live sliding windows held in a `CandleBuffer`.
//
// Feed failures are plain `anyhow` errors; the engine wraps and propagates
// them without retrying.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use super::candle_buffer::{Bar, CandleBuffer, Series};

/// Source of OHLCV history for a provider symbol.
pub trait DataFeed: Send + Sync {
    /// Return up to `bar_count` of the most recent bars (oldest first).
    fn get_series(&self, symbol: &str, timeframe: &str, bar_count: usize) -> Result<Series>;
}

/// Parse a timeframe label such as `"1m"`, `"15m"` or `"1h"`.
pub fn timeframe_duration(timeframe: &str) -> Result<Duration> {
    let split = timeframe
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("timeframe {timeframe:?} has no unit"))?;
    let (count, unit) = timeframe.split_at(split);
    let count: i64 = count
        .parse()
        .with_context(|| format!("timeframe {timeframe:?} has no count"))?;
    if count <= 0 {
        bail!("timeframe {timeframe:?} must be positive");
    }
    match unit {
        "s" => Ok(Duration::seconds(count)),
        "m" => Ok(Duration::minutes(count)),
        "h" => Ok(Duration::hours(count)),
        "d" => Ok(Duration::days(count)),
        _ => bail!("timeframe {timeframe:?} has unsupported unit {unit:?}"),
    }
}

// ---------------------------------------------------------------------------
// SimulatedFeed
// ---------------------------------------------------------------------------

/// Per-bar standard deviation of log returns in the synthetic walk.
const RETURN_VOLATILITY: f64 = 0.002;
/// Standard deviation of close-vs-open and wick noise.
const BAR_NOISE: f64 = 0.001;

/// Deterministic synthetic OHLCV generator.
///
/// Each symbol gets its own base price, drift, and noise stream, seeded from
/// a SHA-256 of the symbol so the walk is stable across processes.
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    anchor: Option<DateTime<Utc>>,
}

impl SimulatedFeed {
    /// Bars end at the current minute of each call.
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// Bars always end at `anchor`; used for replayable runs.
    pub fn with_anchor(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor: Some(anchor),
        }
    }

    fn seed_for(symbol: &str) -> u64 {
        let digest = Sha256::digest(symbol.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFeed for SimulatedFeed {
    fn get_series(&self, symbol: &str, timeframe: &str, bar_count: usize) -> Result<Series> {
        let step = timeframe_duration(timeframe)?;
        let end = match self.anchor {
            Some(anchor) => anchor,
            None => Utc::now()
                .duration_trunc(step)
                .context("failed to align simulated feed clock")?,
        };

        let mut rng = StdRng::seed_from_u64(Self::seed_for(symbol));
        let base_price: f64 = rng.gen_range(1.0..2000.0);
        let drift: f64 = rng.gen_range(-0.001..0.001);

        let mut log_price = 0.0;
        let mut bars = Vec::with_capacity(bar_count);
        for i in 0..bar_count {
            log_price += drift + RETURN_VOLATILITY * standard_normal(&mut rng);
            let open = base_price * log_price.exp();
            let close = open * (1.0 + BAR_NOISE * standard_normal(&mut rng));
            let high = open.max(close) * (1.0 + (BAR_NOISE * standard_normal(&mut rng)).abs());
            let low = open.min(close) * (1.0 - (BAR_NOISE * standard_normal(&mut rng)).abs());
            let volume = rng.gen_range(1_000.0..10_000.0);

            let bars_back = i32::try_from(bar_count - 1 - i).context("bar count too large")?;
            bars.push(Bar {
                timestamp: end - step * bars_back,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(Series::from_bars(bar_count, bars))
    }
}

/// Box-Muller draw from N(0, 1).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

// ---------------------------------------------------------------------------
// BufferedFeed
// ---------------------------------------------------------------------------

/// Serves bars from a shared live [`CandleBuffer`].  The buffer holds a single
/// timeframe, so `timeframe` is only validated.
pub struct BufferedFeed {
    buffer: Arc<CandleBuffer>,
}

impl BufferedFeed {
    pub fn new(buffer: Arc<CandleBuffer>) -> Self {
        Self { buffer }
    }
}

impl DataFeed for BufferedFeed {
    fn get_series(&self, symbol: &str, timeframe: &str, bar_count: usize) -> Result<Series> {
        timeframe_duration(timeframe)?;
        Ok(self.buffer.snapshot(symbol, bar_count))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
