//! Post-peak decay rate strategies.

use crate::error::{LifetimeError, Result};
use crate::features::trend::linear_trend;
use crate::utils::{finite_or_zero, mean};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of samples after the peak for the slope-based decay.
pub const MIN_POST_PEAK_POINTS: usize = 3;

/// Largest fit window for the slope-based decay: the peak plus five samples.
pub const MAX_DECAY_WINDOW: usize = 6;

/// How `initial_decay_rate` is computed.
///
/// A model trained under one strategy must only be queried with vectors
/// extracted under the same strategy; the tag is persisted with the model
/// artifacts and checked at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayRateStrategy {
    /// Mean of all values at and after the peak (residual attention).
    MeanAfterPeak,
    /// Negated OLS slope over the peak and the samples right after it.
    #[default]
    PostPeakSlope,
}

impl DecayRateStrategy {
    /// Persisted tag.
    pub fn tag(&self) -> &'static str {
        match self {
            DecayRateStrategy::MeanAfterPeak => "mean_after_peak",
            DecayRateStrategy::PostPeakSlope => "post_peak_slope",
        }
    }

    /// Compute the decay rate for `values` peaking at `peak_index`.
    ///
    /// Always finite and non-negative for non-negative input.
    pub fn compute(&self, values: &[f64], peak_index: usize) -> f64 {
        if peak_index >= values.len() {
            return 0.0;
        }
        match self {
            DecayRateStrategy::MeanAfterPeak => mean_after_peak(values, peak_index),
            DecayRateStrategy::PostPeakSlope => post_peak_slope(values, peak_index),
        }
    }
}

impl fmt::Display for DecayRateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DecayRateStrategy {
    type Err = LifetimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean_after_peak" => Ok(DecayRateStrategy::MeanAfterPeak),
            "post_peak_slope" => Ok(DecayRateStrategy::PostPeakSlope),
            other => Err(LifetimeError::InvalidParameter(format!(
                "unknown decay strategy '{}'",
                other
            ))),
        }
    }
}

fn mean_after_peak(values: &[f64], peak_index: usize) -> f64 {
    finite_or_zero(mean(&values[peak_index..]))
}

fn post_peak_slope(values: &[f64], peak_index: usize) -> f64 {
    if peak_index + MIN_POST_PEAK_POINTS >= values.len() {
        return 0.0;
    }
    let end = (peak_index + MAX_DECAY_WINDOW).min(values.len());
    let slope = finite_or_zero(linear_trend(&values[peak_index..end]).slope);
    if slope < 0.0 {
        -slope
    } else {
        0.0
    }
}
