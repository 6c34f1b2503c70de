//! Lifetime labels for historical series.

use crate::core::LifetimeLabel;
use crate::detection::SeriesAnalysis;
use crate::error::{LifetimeError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Where a lifetime is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAnchor {
    #[default]
    RiseStart,
    Peak,
}

/// How elapsed time is converted to months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthCounting {
    /// `(Δyear)·12 + Δmonth`, ignoring the day of month.
    #[default]
    Calendar,
    /// Whole elapsed days divided by 30, truncated.
    ThirtyDay,
}

/// Labelling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Peaks below this emit no training row.
    pub min_signal: f64,
    pub anchor: LabelAnchor,
    pub month_counting: MonthCounting,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min_signal: 10.0,
            anchor: LabelAnchor::RiseStart,
            month_counting: MonthCounting::Calendar,
        }
    }
}

impl LabelConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_signal.is_finite() || self.min_signal < 0.0 {
            return Err(LifetimeError::InvalidParameter(format!(
                "min_signal must be a non-negative number, got {}",
                self.min_signal
            )));
        }
        Ok(())
    }
}

/// Months between two instants under the given counting rule.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>, counting: MonthCounting) -> i64 {
    match counting {
        MonthCounting::Calendar => {
            (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
        }
        MonthCounting::ThirtyDay => (to - from).num_days() / 30,
    }
}

/// Assigns lifetime labels to analysed series.
#[derive(Debug, Clone, Default)]
pub struct LifetimeLabeler {
    config: LabelConfig,
}

impl LifetimeLabeler {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Label a series, or `None` when its peak is below `min_signal`.
    pub fn label(&self, analysis: &SeriesAnalysis) -> Option<LifetimeLabel> {
        let b = &analysis.boundaries;
        if b.peak.value < self.config.min_signal {
            return None;
        }
        if b.is_dead_on_arrival() {
            return Some(LifetimeLabel::Months(0));
        }
        let Some(rise) = b.rise_start else {
            return Some(LifetimeLabel::Months(0));
        };
        let Some(death) = b.death else {
            return Some(LifetimeLabel::Ongoing);
        };

        let timestamps = analysis.processed.timestamps();
        let anchor = match self.config.anchor {
            LabelAnchor::RiseStart => timestamps[rise],
            LabelAnchor::Peak => b.peak.timestamp,
        };
        let months = months_between(anchor, timestamps[death], self.config.month_counting);
        let months = u32::try_from(months.max(1)).unwrap_or(u32::MAX);
        Some(LifetimeLabel::Months(months))
    }
}
