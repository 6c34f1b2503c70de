//! Peak, rise-start and death boundary location.
//!
//! All lifetime features and labels key off the boundaries found here:
//!
//! - **Peak**: first occurrence of the series maximum.
//! - **Rise start**: first sample at or above `rise_fraction` of the peak.
//! - **Death**: depends on [`DeathPolicy`].
//!
//! A peak of 0 means the term never drew measurable interest; such series
//! are "dead on arrival" and carry no rise or death boundary.

use crate::core::TimeSeries;
use crate::error::{LifetimeError, Result};
use crate::transform::Preprocessor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rule deciding when a trend has permanently fallen off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathPolicy {
    /// From rise start, the first sample where it and the next sample are
    /// both below `simple_death_fraction` of the peak.
    #[default]
    Simple,
    /// From the peak, the first sample below `strict_death_fraction` of the
    /// peak.
    StrictTail,
}

/// Boundary thresholds, as fractions of the peak value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub rise_fraction: f64,
    pub death_policy: DeathPolicy,
    pub simple_death_fraction: f64,
    pub strict_death_fraction: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            rise_fraction: 0.10,
            death_policy: DeathPolicy::Simple,
            simple_death_fraction: 0.05,
            strict_death_fraction: 0.01,
        }
    }
}

impl BoundaryConfig {
    /// Default thresholds with the given death policy.
    pub fn with_policy(death_policy: DeathPolicy) -> Self {
        Self {
            death_policy,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rise_fraction", self.rise_fraction),
            ("simple_death_fraction", self.simple_death_fraction),
            ("strict_death_fraction", self.strict_death_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(LifetimeError::InvalidParameter(format!(
                    "{} must be in (0, 1), got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Death threshold fraction of the active policy.
    pub fn death_fraction(&self) -> f64 {
        match self.death_policy {
            DeathPolicy::Simple => self.simple_death_fraction,
            DeathPolicy::StrictTail => self.strict_death_fraction,
        }
    }
}

/// Location of the series maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Boundaries located on one series. Indices refer to that series.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundaries {
    pub peak: Peak,
    /// First index at or above the rise threshold.
    pub rise_start: Option<usize>,
    /// Death index under `death_policy`; `None` means still alive.
    pub death: Option<usize>,
    /// Samples strictly above the rise threshold (diagnostic only).
    pub active_points: usize,
    pub death_policy: DeathPolicy,
}

impl Boundaries {
    /// The series never showed measurable interest.
    pub fn is_dead_on_arrival(&self) -> bool {
        self.peak.value <= 0.0
    }

    pub fn has_rise(&self) -> bool {
        self.rise_start.is_some()
    }

    pub fn is_ongoing(&self) -> bool {
        !self.is_dead_on_arrival() && self.rise_start.is_some() && self.death.is_none()
    }
}

/// Find the first occurrence of the maximum. Non-finite samples are skipped.
pub fn find_peak(series: &TimeSeries) -> Result<Peak> {
    if series.is_empty() {
        return Err(LifetimeError::EmptyData);
    }
    let values = series.values();

    let mut index = 0;
    let mut value = 0.0;
    let mut found = false;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        if !found || v > value {
            index = i;
            value = v;
            found = true;
        }
    }

    Ok(Peak {
        index,
        timestamp: series.timestamps()[index],
        value: value.max(0.0),
    })
}

/// First index whose value is at least `fraction` of `peak_value`.
pub fn rise_start(values: &[f64], peak_value: f64, fraction: f64) -> Option<usize> {
    if peak_value <= 0.0 {
        return None;
    }
    let threshold = peak_value * fraction;
    values.iter().position(|&v| v >= threshold)
}

/// First `t >= from` where both `values[t]` and `values[t + 1]` are below
/// `threshold`.
pub fn simple_death(values: &[f64], from: usize, threshold: f64) -> Option<usize> {
    if values.len() < 2 {
        return None;
    }
    (from..values.len() - 1).find(|&t| values[t] < threshold && values[t + 1] < threshold)
}

/// First `t >= peak_index` with `values[t]` below `threshold`.
pub fn strict_tail_death(values: &[f64], peak_index: usize, threshold: f64) -> Option<usize> {
    (peak_index..values.len()).find(|&t| values[t] < threshold)
}

/// Locate peak, rise start and death boundary on a preprocessed series.
pub fn locate_boundaries(series: &TimeSeries, config: &BoundaryConfig) -> Result<Boundaries> {
    let peak = find_peak(series)?;
    let values = series.values();

    if peak.value <= 0.0 {
        return Ok(Boundaries {
            peak,
            rise_start: None,
            death: None,
            active_points: 0,
            death_policy: config.death_policy,
        });
    }

    let rise = rise_start(values, peak.value, config.rise_fraction);
    let rise_threshold = peak.value * config.rise_fraction;
    let active_points = values.iter().filter(|&&v| v > rise_threshold).count();

    let death_threshold = peak.value * config.death_fraction();
    let death = match (config.death_policy, rise) {
        (_, None) => None,
        (DeathPolicy::Simple, Some(start)) => simple_death(values, start, death_threshold),
        (DeathPolicy::StrictTail, Some(_)) => {
            strict_tail_death(values, peak.index, death_threshold)
        }
    };

    Ok(Boundaries {
        peak,
        rise_start: rise,
        death,
        active_points,
        death_policy: config.death_policy,
    })
}

/// A preprocessed series together with its boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesAnalysis {
    pub processed: TimeSeries,
    pub boundaries: Boundaries,
}

impl SeriesAnalysis {
    /// Preprocess `series` and locate its boundaries.
    pub fn analyze(
        series: &TimeSeries,
        preprocessor: &Preprocessor,
        config: &BoundaryConfig,
    ) -> Result<Self> {
        let processed = preprocessor.process(series)?;
        let boundaries = locate_boundaries(&processed, config)?;
        debug!(
            term = processed.term().unwrap_or("<unnamed>"),
            peak_index = boundaries.peak.index,
            peak_value = boundaries.peak.value,
            rise_start = ?boundaries.rise_start,
            death = ?boundaries.death,
            "located series boundaries"
        );
        Ok(Self {
            processed,
            boundaries,
        })
    }

    pub fn rise_start_time(&self) -> Option<DateTime<Utc>> {
        self.boundaries
            .rise_start
            .map(|i| self.processed.timestamps()[i])
    }

    pub fn death_time(&self) -> Option<DateTime<Utc>> {
        self.boundaries.death.map(|i| self.processed.timestamps()[i])
    }

    pub fn peak_time(&self) -> DateTime<Utc> {
        self.boundaries.peak.timestamp
    }
}
