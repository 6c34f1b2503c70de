//! Series cleaning ahead of boundary detection.

use crate::core::TimeSeries;
use crate::error::{LifetimeError, Result};
use crate::transform::window::rolling_mean;
use serde::{Deserialize, Serialize};

/// Preprocessing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Apply the trailing rolling mean after zero-filling.
    pub smoothing: bool,
    /// Window of the trailing rolling mean.
    pub smoothing_window: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            smoothing: false,
            smoothing_window: 3,
        }
    }
}

impl PreprocessConfig {
    /// Zero-fill only.
    pub fn raw() -> Self {
        Self::default()
    }

    /// Zero-fill, then a window-3 trailing mean.
    pub fn smoothed() -> Self {
        Self {
            smoothing: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.smoothing && self.smoothing_window == 0 {
            return Err(LifetimeError::InvalidParameter(
                "smoothing_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Zero-fills and optionally smooths interest series.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Replace every missing sample with 0. Never interpolates.
    pub fn fill_missing(&self, series: &TimeSeries) -> TimeSeries {
        series.zero_filled()
    }

    /// Trailing mean over the configured window, partial windows allowed.
    pub fn smooth(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let smoothed = rolling_mean(series.values(), self.config.smoothing_window, 1);
        series.with_values(smoothed)
    }

    /// Full preprocessing: same length and timestamps as the input.
    ///
    /// Fails with `EmptyData` on an empty series.
    pub fn process(&self, series: &TimeSeries) -> Result<TimeSeries> {
        if series.is_empty() {
            return Err(LifetimeError::EmptyData);
        }
        let filled = self.fill_missing(series);
        if self.config.smoothing {
            self.smooth(&filled)
        } else {
            Ok(filled)
        }
    }
}
