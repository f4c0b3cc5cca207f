// =============================================================================
// Support / Resistance Levels
// =============================================================================
//
// A bar `i` with `window <= i < len - window` is a resistance pivot when its
// high equals the maximum high over `[i - window, i + window]`, and a support
// pivot when its low equals the minimum low over the same span.  Only the
// three most recent pivots of each kind are kept.

use serde::{Deserialize, Serialize};

/// Number of most-recent pivots retained per side.
pub const MAX_LEVELS: usize = 3;

/// Detected levels, oldest first within each list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub resistance: Vec<f64>,
    pub support: Vec<f64>,
}

/// Detect pivot levels over `high` / `low` using a symmetric `window`.
pub fn detect_levels(high: &[f64], low: &[f64], window: usize) -> SupportResistance {
    let len = high.len().min(low.len());
    let mut resistance = Vec::new();
    let mut support = Vec::new();

    if window == 0 || len <= 2 * window {
        return SupportResistance::default();
    }

    for i in window..len - window {
        let span = i - window..=i + window;

        let max_high = high[span.clone()].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if high[i] == max_high {
            resistance.push(high[i]);
        }

        let min_low = low[span].iter().copied().fold(f64::INFINITY, f64::min);
        if low[i] == min_low {
            support.push(low[i]);
        }
    }

    SupportResistance {
        resistance: keep_recent(resistance),
        support: keep_recent(support),
    }
}

/// The level closest to `price`, if any.
pub fn nearest_level(levels: &[f64], price: f64) -> Option<f64> {
    levels
        .iter()
        .copied()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
}

fn keep_recent(mut levels: Vec<f64>) -> Vec<f64> {
    let start = levels.len().saturating_sub(MAX_LEVELS);
    levels.drain(..start);
    levels
}
