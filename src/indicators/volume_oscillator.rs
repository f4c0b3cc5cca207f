// =============================================================================
// Volume Oscillator
// =============================================================================
//
//   VO = (SMA(volume, short) - SMA(volume, long)) / SMA(volume, long) * 100
//
// Positive when recent volume runs above its longer baseline.

use super::sma::calculate_sma;

/// Compute the volume oscillator aligned with `volume`.
///
/// Undefined until the long average is defined, and wherever the long
/// average is zero.
pub fn calculate_volume_oscillator(volume: &[f64], short: usize, long: usize) -> Vec<Option<f64>> {
    let fast = calculate_sma(volume, short);
    let slow = calculate_sma(volume, long);

    fast.into_iter()
        .zip(slow)
        .map(|(s, l)| match (s, l) {
            (Some(s), Some(l)) if l != 0.0 => Some((s - l) / l * 100.0),
            _ => None,
        })
        .collect()
}
