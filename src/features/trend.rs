//! Least-squares linear trend over an index-spaced window.
//!
//! Shared by the post-peak decay rate and the recency-growth term of the
//! neologism trend score.

/// Result of linear regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrendResult {
    /// Slope of the fitted line (value units per sample)
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
}

/// Computes linear trend statistics for the window.
///
/// Fits a linear regression y = slope * x + intercept where x is the index.
/// Fewer than two points yields NaN for every field.
pub fn linear_trend(series: &[f64]) -> LinearTrendResult {
    if series.len() < 2 {
        return LinearTrendResult {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
        };
    }

    let n = series.len() as f64;

    // x values are indices 0, 1, 2, ...
    let sum_x: f64 = (0..series.len()).map(|i| i as f64).sum();
    let sum_y: f64 = series.iter().sum();
    let sum_xy: f64 = series.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..series.len()).map(|i| (i * i) as f64).sum();

    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let ss_xx = sum_x2 - n * mean_x * mean_x;
    let ss_xy = sum_xy - n * mean_x * mean_y;

    if ss_xx.abs() < 1e-10 {
        return LinearTrendResult {
            slope: 0.0,
            intercept: mean_y,
            r_squared: 0.0,
        };
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_yy: f64 = series.iter().map(|&y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = series
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let y_pred = slope * i as f64 + intercept;
            (y - y_pred).powi(2)
        })
        .sum();

    let r_squared = if ss_yy.abs() < 1e-10 {
        1.0 // Perfect fit for constant y
    } else {
        1.0 - ss_res / ss_yy
    };

    LinearTrendResult {
        slope,
        intercept,
        r_squared,
    }
}
