// =============================================================================
// MACD: Moving Average Convergence Divergence
// =============================================================================
//
//   MACD line   = EMA(12) - EMA(26)
//   Signal line = EMA(9) of the MACD line
//   Histogram   = MACD line - Signal line
//
// The MACD line is first defined at index 25, the signal line at index 33.

use super::ema::calculate_ema;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

/// The three MACD series, each aligned with the input closes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute MACD(12, 26, 9) over `closes`.
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let fast = calculate_ema(closes, FAST_PERIOD);
    let slow = calculate_ema(closes, SLOW_PERIOD);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA runs over the defined stretch of the MACD line only.
    let mut signal = vec![None; closes.len()];
    if let Some(start) = macd.iter().position(Option::is_some) {
        let defined: Vec<f64> = macd[start..].iter().map_while(|v| *v).collect();
        for (offset, value) in calculate_ema(&defined, SIGNAL_PERIOD).into_iter().enumerate() {
            signal[start + offset] = value;
        }
    }

    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
