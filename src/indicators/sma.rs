// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_i = (x_{i-period+1} + ... + x_i) / period
//
// Undefined for the first `period - 1` positions.

/// Compute the SMA series aligned with `values`.
///
/// `period == 0` yields an all-`None` series.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let divisor = period as f64;
    for (offset, window) in values.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / divisor);
    }
    out
}
