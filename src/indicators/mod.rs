// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the signal
// engine.  Every series function returns a `Vec<Option<f64>>` aligned with its
// input: position `i` holds the value at bar `i`, or `None` while the
// indicator is still inside its lookback.  Short input is never an error;
// callers check `latest()` / `previous()` before reading.

pub mod demarker;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod support_resistance;
pub mod volume_oscillator;
pub mod wma;

pub use demarker::calculate_demarker;
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use support_resistance::{detect_levels, nearest_level, SupportResistance};
pub use volume_oscillator::calculate_volume_oscillator;
pub use wma::calculate_wma;

/// Value at the newest bar, if defined.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Value at the bar before the newest, if defined.
pub fn previous(series: &[Option<f64>]) -> Option<f64> {
    series.len().checked_sub(2).and_then(|i| series[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_and_previous() {
        let s = vec![None, Some(1.0), Some(2.0)];
        assert_eq!(latest(&s), Some(2.0));
        assert_eq!(previous(&s), Some(1.0));
    }

    #[test]
    fn latest_and_previous_on_short_input() {
        assert_eq!(latest(&[]), None);
        assert_eq!(previous(&[Some(1.0)]), None);
        assert_eq!(previous(&[None, Some(1.0)]), None);
    }
}
