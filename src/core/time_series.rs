//! TimeSeries data structure for interest-over-time data.

use crate::error::{LifetimeError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

/// An interest-over-time series for a single term.
///
/// Values are a normalized popularity index in `[0, 100]`; missing samples
/// are stored as NaN until the series is zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    term: Option<String>,
}

impl TimeSeries {
    /// Create a new TimeSeries, validating timestamps and lengths.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        term: Option<String>,
    ) -> Result<Self> {
        // Validate timestamps are strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(LifetimeError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        if values.len() != timestamps.len() {
            return Err(LifetimeError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        Ok(Self {
            timestamps,
            values,
            term,
        })
    }

    /// Create an unnamed series.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(timestamps, values, None)
    }

    /// Create a monthly series starting at the first day of `start`'s month.
    pub fn monthly(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let origin = month_origin(start)?;
        let timestamps = (0..values.len())
            .map(|i| {
                origin
                    .checked_add_months(Months::new(i as u32))
                    .ok_or_else(|| {
                        LifetimeError::TimestampError("monthly timestamp overflow".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::univariate(timestamps, values)
    }

    /// Create a weekly series starting at midnight UTC on `start`.
    pub fn weekly(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let origin = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).ok_or_else(|| {
            LifetimeError::TimestampError("invalid start date".to_string())
        })?);
        let timestamps = (0..values.len())
            .map(|i| origin + Duration::weeks(i as i64))
            .collect();
        Self::univariate(timestamps, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the term this series describes, if known.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Set the term name.
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = Some(term.into());
    }

    /// Return a copy carrying the given term name.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.set_term(term);
        self
    }

    /// Return a copy with the same timestamps and new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        TimeSeries::new(self.timestamps.clone(), values, self.term.clone())
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(LifetimeError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(LifetimeError::DimensionMismatch {
                expected: self.len(),
                got: end,
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            term: self.term.clone(),
        })
    }

    /// Keep only the observations in the first `months` calendar months,
    /// i.e. strictly before the first timestamp plus `months` (12 monthly
    /// samples for a one-year window).
    pub fn window_months(&self, months: u32) -> Result<TimeSeries> {
        let Some(&first) = self.timestamps.first() else {
            return Ok(self.clone());
        };
        let limit = first
            .checked_add_months(Months::new(months))
            .ok_or_else(|| LifetimeError::TimestampError("window end overflow".to_string()))?;
        let end = self.timestamps.partition_point(|t| *t < limit);
        self.slice(0, end)
    }

    /// Copy with every missing sample (NaN or infinite) replaced by 0.
    ///
    /// No data from the source is indistinguishable from zero interest.
    pub fn zero_filled(&self) -> TimeSeries {
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values: self
                .values
                .iter()
                .map(|&v| if v.is_finite() { v } else { 0.0 })
                .collect(),
            term: self.term.clone(),
        }
    }
}

fn month_origin(start: NaiveDate) -> Result<DateTime<Utc>> {
    let first = start
        .with_day0(0)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| LifetimeError::TimestampError("invalid start date".to_string()))?;
    Ok(Utc.from_utc_datetime(&first))
}
