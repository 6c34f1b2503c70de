//! Trailing window functions.

/// Compute a trailing rolling mean.
///
/// Each output is the mean of the value and up to `window - 1` preceding
/// values. Positions with fewer than `min_periods` values available are NaN,
/// so `min_periods = 1` keeps partial windows at the start.
pub fn rolling_mean(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let n = series.len();
    let mut result = vec![f64::NAN; n];

    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        let count = i + 1 - start;
        if count < min_periods.max(1) {
            continue;
        }
        let sum: f64 = series[start..=i].iter().sum();
        result[i] = sum / count as f64;
    }

    result
}
