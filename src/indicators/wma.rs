// =============================================================================
// Weighted Moving Average (WMA)
// =============================================================================
//
// Linear weights 1..=period, oldest bar weighted 1, newest weighted `period`:
//
//   WMA_i = Σ_{k=1..period} k * x_{i-period+k}  /  (period * (period + 1) / 2)

/// Compute the WMA series aligned with `values`.
pub fn calculate_wma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let weight_sum = (period * (period + 1)) as f64 / 2.0;
    for (offset, window) in values.windows(period).enumerate() {
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(k, x)| x * (k + 1) as f64)
            .sum();
        out[offset + period - 1] = Some(weighted / weight_sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wma_weights_newest_heaviest() {
        // (1*1 + 2*2 + 3*9) / 6 = 32 / 6
        let wma = calculate_wma(&[1.0, 2.0, 9.0], 3);
        assert_eq!(wma[..2], [None, None]);
        assert!((wma[2].unwrap() - 32.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn wma_reacts_faster_than_sma() {
        let values: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let wma = calculate_wma(&values, 10).last().copied().flatten().unwrap();
        let sma = crate::indicators::calculate_sma(&values, 10)
            .last()
            .copied()
            .flatten()
            .unwrap();
        assert!(wma > sma);
    }

    #[test]
    fn wma_short_input() {
        assert_eq!(calculate_wma(&[1.0], 25), vec![None]);
    }

    proptest! {
        #[test]
        fn wma_of_constant_series_is_constant(k in 0.01..10_000.0_f64, len in 1usize..200, period in 1usize..50) {
            let values = vec![k; len];
            for v in calculate_wma(&values, period).into_iter().flatten() {
                prop_assert!((v - k).abs() <= k * 1e-12);
            }
        }
    }
}
