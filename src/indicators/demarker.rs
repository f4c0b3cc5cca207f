// =============================================================================
// DeMarker Oscillator
// =============================================================================
//
// Compares how far each bar extends beyond the previous one:
//
//   DeMax_i = max(0, high_i - high_{i-1})
//   DeMin_i = max(0, low_{i-1} - low_i)
//   DeM_i   = SMA(DeMax, n) / (SMA(DeMax, n) + SMA(DeMin, n))
//
// Bar 0 has no predecessor, so the first full window ends at index `period`.
// Range is [0, 1]; undefined where both averages are zero.

/// Compute the DeMarker series aligned with `high` / `low`.
///
/// `high` and `low` must be the same length; extra elements of the longer
/// slice are ignored.
pub fn calculate_demarker(high: &[f64], low: &[f64], period: usize) -> Vec<Option<f64>> {
    let len = high.len().min(low.len());
    let mut out = vec![None; len];
    if period == 0 || len < period + 1 {
        return out;
    }

    let de_max: Vec<f64> = high[..len].windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let de_min: Vec<f64> = low[..len].windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let divisor = period as f64;
    // de_max[j] belongs to bar j + 1.
    for (offset, (up, down)) in de_max.windows(period).zip(de_min.windows(period)).enumerate() {
        let avg_up = up.iter().sum::<f64>() / divisor;
        let avg_down = down.iter().sum::<f64>() / divisor;
        let denominator = avg_up + avg_down;
        if denominator > 0.0 {
            out[offset + period] = Some(avg_up / denominator);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn demarker_rising_bars_is_one() {
        let high: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let dem = calculate_demarker(&high, &low, 14);
        assert!(dem[13].is_none());
        assert_eq!(dem[14], Some(1.0));
        assert_eq!(dem[19], Some(1.0));
    }

    #[test]
    fn demarker_falling_bars_is_zero() {
        let high: Vec<f64> = (0..20).map(|i| 50.0 - i as f64).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        assert_eq!(calculate_demarker(&high, &low, 14)[19], Some(0.0));
    }

    #[test]
    fn demarker_flat_bars_undefined() {
        let dem = calculate_demarker(&[5.0; 30], &[4.0; 30], 14);
        assert!(dem.iter().all(Option::is_none));
    }

    #[test]
    fn demarker_balanced_moves() {
        // Alternating +1 / -1 highs and lows: equal extension both ways.
        let high: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 2.0).collect();
        let v = calculate_demarker(&high, &low, 14)[29].unwrap();
        assert!((v - 0.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn demarker_within_unit_interval(
            bars in prop::collection::vec((1.0..1_000.0_f64, 0.0..50.0_f64), 0..200),
            period in 1usize..30,
        ) {
            let high: Vec<f64> = bars.iter().map(|(h, _)| *h).collect();
            let low: Vec<f64> = bars.iter().map(|(h, spread)| h - spread).collect();
            for v in calculate_demarker(&high, &low, period).into_iter().flatten() {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
