//! Trend-based newness score.

use crate::core::TimeSeries;
use crate::error::{LifetimeError, Result};
use crate::features::linear_trend;
use crate::utils::{finite_or_zero, mean};
use serde::{Deserialize, Serialize};

/// Parameters of the trend score.
///
/// `score = growth_weight * growth + novelty_weight * novelty
///          - history_weight * past_mean / 100`, clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendScoreConfig {
    /// Size of the recent window; series shorter than this score 0.
    pub recent_window: usize,
    pub growth_weight: f64,
    pub novelty_weight: f64,
    pub history_weight: f64,
}

impl Default for TrendScoreConfig {
    fn default() -> Self {
        Self {
            recent_window: 30,
            growth_weight: 0.4,
            novelty_weight: 0.4,
            history_weight: 0.1,
        }
    }
}

impl TrendScoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.recent_window < 2 {
            return Err(LifetimeError::InvalidParameter(
                "recent_window must be at least 2".to_string(),
            ));
        }
        for (name, w) in [
            ("growth_weight", self.growth_weight),
            ("novelty_weight", self.novelty_weight),
            ("history_weight", self.history_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(LifetimeError::InvalidParameter(format!(
                    "{} must be non-negative, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// Slope that maps to full growth.
const GROWTH_SCALE: f64 = 10.0;
/// Recent/past ratio that maps to full novelty.
const NOVELTY_CAP: f64 = 5.0;
/// Past means below this count as "never used before".
const QUIET_PAST: f64 = 1.0;
/// Recent mean above which a quiet past counts as fully novel.
const BREAKOUT_LEVEL: f64 = 5.0;

/// Score how much a series looks like a term that only just appeared.
///
/// Missing samples are treated as 0. Never fails.
pub fn trend_score(series: &TimeSeries, config: &TrendScoreConfig) -> f64 {
    let values: Vec<f64> = series.values().iter().map(|&v| finite_or_zero(v)).collect();
    if values.len() < config.recent_window || config.recent_window == 0 {
        return 0.0;
    }

    let split = values.len() - config.recent_window;
    let (past, recent) = values.split_at(split);

    let slope = finite_or_zero(linear_trend(recent).slope);
    let growth = (slope.max(0.0) / GROWTH_SCALE).min(1.0);

    let past_mean = if past.is_empty() { 0.0 } else { mean(past) };
    let recent_mean = mean(recent);

    let novelty = if past_mean < QUIET_PAST {
        if recent_mean > BREAKOUT_LEVEL {
            1.0
        } else {
            0.0
        }
    } else {
        (recent_mean / past_mean).min(NOVELTY_CAP) / NOVELTY_CAP
    };

    let score = config.growth_weight * growth + config.novelty_weight * novelty
        - config.history_weight * (past_mean / 100.0);
    finite_or_zero(score).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn weekly(values: Vec<f64>) -> TimeSeries {
        TimeSeries::weekly(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), values).unwrap()
    }

    #[test]
    fn short_series_scores_zero() {
        let series = weekly(vec![50.0; 29]);
        assert_eq!(trend_score(&series, &TrendScoreConfig::default()), 0.0);
    }

    #[test]
    fn sudden_breakout_from_silence() {
        let mut values = vec![0.0; 20];
        values.extend((0..30).map(|i| i as f64 * 3.0));
        let score = trend_score(&weekly(values), &TrendScoreConfig::default());

        // growth = 3/10, novelty = 1, no history
        assert_relative_eq!(score, 0.4 * 0.3 + 0.4, epsilon = 1e-10);
    }

    #[test]
    fn established_flat_term_scores_low() {
        let score = trend_score(&weekly(vec![60.0; 80]), &TrendScoreConfig::default());
        // growth 0, novelty 1/5, history 0.6
        assert_relative_eq!(score, 0.4 * 0.2 - 0.1 * 0.6, epsilon = 1e-10);
    }

    #[test]
    fn exactly_thirty_points_has_no_past() {
        let values: Vec<f64> = (0..30).map(|i| i as f64 * 20.0).collect();
        let score = trend_score(&weekly(values), &TrendScoreConfig::default());
        assert_relative_eq!(score, 0.8, epsilon = 1e-10);
    }

    #[test]
    fn missing_values_are_zero_filled() {
        let values = vec![f64::NAN; 40];
        assert_eq!(trend_score(&weekly(values), &TrendScoreConfig::default()), 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(TrendScoreConfig::default().validate().is_ok());
        let bad = TrendScoreConfig {
            recent_window: 1,
            ..TrendScoreConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
