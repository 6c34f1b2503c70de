//! Early-dynamics feature extraction.

use crate::core::TimeSeries;
use crate::detection::{BoundaryConfig, Boundaries, SeriesAnalysis};
use crate::error::Result;
use crate::features::decay::DecayRateStrategy;
use crate::features::schema::{FeatureKind, FeatureSchema, FeatureSet, FeatureVector};
use crate::transform::Preprocessor;
use crate::utils::{finite_or_zero, std_dev};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which features to extract and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub feature_set: FeatureSet,
    pub decay_strategy: DecayRateStrategy,
    /// Restrict extraction to the first N calendar months of the series.
    pub observation_months: Option<u32>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            feature_set: FeatureSet::FourFeature,
            decay_strategy: DecayRateStrategy::PostPeakSlope,
            observation_months: None,
        }
    }
}

impl FeatureConfig {
    pub fn schema(&self) -> FeatureSchema {
        self.feature_set.schema()
    }
}

/// Character count with all whitespace removed.
pub fn word_length(word: &str) -> usize {
    word.chars().filter(|c| !c.is_whitespace()).count()
}

/// Largest single-step increase `v[t] - v[t-1]` for `t` in
/// `[rise_start, peak]`, floored at 0.
pub fn max_rising_slope(values: &[f64], boundaries: &Boundaries) -> f64 {
    if boundaries.is_dead_on_arrival() {
        return 0.0;
    }
    let Some(rise) = boundaries.rise_start else {
        return 0.0;
    };
    let peak = boundaries.peak.index.min(values.len().saturating_sub(1));
    let start = rise.max(1);
    if start > peak {
        return 0.0;
    }

    let max_diff = (start..=peak)
        .map(|t| values[t] - values[t - 1])
        .fold(f64::NEG_INFINITY, f64::max);
    finite_or_zero(max_diff).max(0.0)
}

/// Sample standard deviation of the values strictly before the peak.
pub fn initial_volatility(values: &[f64], peak_index: usize) -> f64 {
    let end = peak_index.min(values.len());
    if end < 2 {
        return 0.0;
    }
    finite_or_zero(std_dev(&values[..end]))
}

/// Computes feature vectors from interest series.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    preprocessor: Preprocessor,
    boundary: BoundaryConfig,
}

impl FeatureExtractor {
    pub fn new(
        config: FeatureConfig,
        preprocessor: Preprocessor,
        boundary: BoundaryConfig,
    ) -> Self {
        Self {
            config,
            preprocessor,
            boundary,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn schema(&self) -> FeatureSchema {
        self.config.schema()
    }

    pub fn decay_strategy(&self) -> DecayRateStrategy {
        self.config.decay_strategy
    }

    /// Features from an already analysed series.
    ///
    /// Dead-on-arrival series keep their word length; every series-derived
    /// feature is 0.
    pub fn compute(&self, word: &str, analysis: &SeriesAnalysis) -> FeatureVector {
        let mut vector = FeatureVector::zeros(self.schema());
        vector.set(FeatureKind::WordLength, word_length(word) as f64);

        let b = &analysis.boundaries;
        if b.is_dead_on_arrival() {
            return vector;
        }
        let values = analysis.processed.values();

        vector.set(FeatureKind::MaxRisingSlope, max_rising_slope(values, b));
        vector.set(FeatureKind::PeakValue, b.peak.value);
        vector.set(
            FeatureKind::InitialVolatility,
            initial_volatility(values, b.peak.index),
        );
        vector.set(
            FeatureKind::InitialDecayRate,
            self.config.decay_strategy.compute(values, b.peak.index),
        );
        vector
    }

    /// Apply the observation window, preprocess and locate boundaries.
    pub fn analyze(&self, series: &TimeSeries) -> Result<SeriesAnalysis> {
        let observed = match self.config.observation_months {
            Some(months) => series.window_months(months)?,
            None => series.clone(),
        };
        SeriesAnalysis::analyze(&observed, &self.preprocessor, &self.boundary)
    }

    /// Window, preprocess and analyse `series`, then compute its features.
    ///
    /// Fails with an insufficient-data error on an empty (or emptied) series.
    pub fn extract(&self, word: &str, series: &TimeSeries) -> Result<FeatureVector> {
        let analysis = self.analyze(series)?;
        Ok(self.compute(word, &analysis))
    }

    /// Like [`extract`](Self::extract), but insufficient data yields the
    /// degenerate vector (word length only) instead of an error.
    pub fn extract_features(&self, word: &str, series: &TimeSeries) -> Result<FeatureVector> {
        match self.extract(word, series) {
            Ok(v) => Ok(v),
            Err(e) if e.is_insufficient_data() => {
                debug!(word, error = %e, "no signal; using degenerate feature vector");
                let mut vector = FeatureVector::zeros(self.schema());
                vector.set(FeatureKind::WordLength, word_length(word) as f64);
                Ok(vector)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::PreprocessConfig;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn monthly(values: Vec<f64>) -> TimeSeries {
        TimeSeries::monthly(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), values).unwrap()
    }

    fn three_feature() -> FeatureExtractor {
        FeatureExtractor::new(
            FeatureConfig {
                feature_set: FeatureSet::ThreeFeature,
                ..FeatureConfig::default()
            },
            Preprocessor::default(),
            BoundaryConfig::default(),
        )
    }

    #[test]
    fn word_length_ignores_whitespace() {
        assert_eq!(word_length("킹 받 네"), 3);
        assert_eq!(word_length(" ok\tboomer "), 7);
        assert_eq!(word_length(""), 0);
    }

    #[test]
    fn single_step_jump_is_the_rising_slope() {
        let series = monthly(vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0]);
        let v = three_feature().extract("킹받네", &series).unwrap();

        assert_eq!(v.get(FeatureKind::WordLength), Some(3.0));
        assert_relative_eq!(v.get(FeatureKind::MaxRisingSlope).unwrap(), 100.0);
        assert_relative_eq!(v.get(FeatureKind::PeakValue).unwrap(), 100.0);
    }

    #[test]
    fn rising_slope_uses_largest_step() {
        let series = monthly(vec![0.0, 20.0, 30.0, 70.0, 80.0, 40.0]);
        let v = three_feature().extract("x", &series).unwrap();
        assert_relative_eq!(v.get(FeatureKind::MaxRisingSlope).unwrap(), 40.0);
    }

    #[test]
    fn peak_at_first_sample_has_no_slope() {
        let series = monthly(vec![100.0, 50.0, 10.0]);
        let v = three_feature().extract("x", &series).unwrap();
        assert_eq!(v.get(FeatureKind::MaxRisingSlope), Some(0.0));
    }

    #[test]
    fn dead_on_arrival_keeps_only_word_length() {
        let extractor = FeatureExtractor::default();
        let v = extractor.extract("어쩔티비", &monthly(vec![0.0; 24])).unwrap();

        assert_eq!(v.schema(), &FeatureSchema::four_feature());
        assert_eq!(v.values(), &[4.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn four_feature_volatility_and_decay() {
        let series = monthly(vec![10.0, 20.0, 30.0, 100.0, 80.0, 60.0, 40.0, 20.0, 0.0]);
        let extractor = FeatureExtractor::default();
        let v = extractor.extract("abc", &series).unwrap();

        // std of [10, 20, 30]
        assert_relative_eq!(v.get(FeatureKind::InitialVolatility).unwrap(), 10.0, epsilon = 1e-10);
        // [100, 80, 60, 40, 20, 0] falls 20 per step
        assert_relative_eq!(v.get(FeatureKind::InitialDecayRate).unwrap(), 20.0, epsilon = 1e-10);
    }

    #[test]
    fn mean_after_peak_strategy() {
        let series = monthly(vec![0.0, 50.0, 100.0, 50.0, 0.0]);
        let extractor = FeatureExtractor::new(
            FeatureConfig {
                decay_strategy: DecayRateStrategy::MeanAfterPeak,
                ..FeatureConfig::default()
            },
            Preprocessor::default(),
            BoundaryConfig::default(),
        );
        let v = extractor.extract("x", &series).unwrap();
        assert_relative_eq!(v.get(FeatureKind::InitialDecayRate).unwrap(), 50.0, epsilon = 1e-10);
    }

    #[test]
    fn observation_window_hides_later_samples() {
        let mut values = vec![10.0; 13];
        values.extend(vec![100.0; 5]);
        let series = monthly(values);

        let windowed = FeatureExtractor::new(
            FeatureConfig {
                feature_set: FeatureSet::ThreeFeature,
                observation_months: Some(12),
                ..FeatureConfig::default()
            },
            Preprocessor::default(),
            BoundaryConfig::default(),
        );
        let v = windowed.extract("x", &series).unwrap();
        assert_eq!(v.get(FeatureKind::PeakValue), Some(10.0));

        let full = three_feature().extract("x", &series).unwrap();
        assert_eq!(full.get(FeatureKind::PeakValue), Some(100.0));
    }

    #[test]
    fn empty_series_degrades_to_word_length() {
        let empty = TimeSeries::univariate(vec![], vec![]).unwrap();
        let extractor = three_feature();

        assert!(extractor.extract("abc", &empty).is_err());
        let v = extractor.extract_features("abc", &empty).unwrap();
        assert_eq!(v.values(), &[3.0, 0.0, 0.0]);
    }

    #[test]
    fn smoothed_features_never_nan() {
        let extractor = FeatureExtractor::new(
            FeatureConfig::default(),
            Preprocessor::new(PreprocessConfig::smoothed()),
            BoundaryConfig::default(),
        );
        let series = monthly(vec![f64::NAN, 5.0, f64::NAN]);
        let v = extractor.extract("x", &series).unwrap();
        assert!(v.values().iter().all(|x| x.is_finite()));
    }
}
