//! Pipeline configuration.
//!
//! One deployment uses one feature set, one death policy and one decay
//! strategy. Artifacts built under a configuration record its schema and
//! decay strategy and are checked against it at load.

use crate::classify::ScorerConfig;
use crate::detection::{BoundaryConfig, DeathPolicy};
use crate::error::{LifetimeError, Result};
use crate::features::{DecayRateStrategy, FeatureConfig, FeatureSet};
use crate::labeling::{LabelAnchor, LabelConfig, MonthCounting};
use crate::models::{KnnConfig, Weighting};
use crate::transform::PreprocessConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every tunable of the lifetime pipeline, loadable from TOML.
///
/// Missing tables and keys fall back to the four-feature preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub boundary: BoundaryConfig,
    pub features: FeatureConfig,
    pub labeling: LabelConfig,
    pub knn: KnnConfig,
    pub scorer: ScorerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::four_feature()
    }
}

impl PipelineConfig {
    /// Unsmoothed series, simple 5% death, `word_length, max_rising_slope,
    /// peak_value`, calendar months from rise start, distance-weighted k-NN.
    pub fn three_feature() -> Self {
        Self {
            preprocess: PreprocessConfig::raw(),
            boundary: BoundaryConfig::with_policy(DeathPolicy::Simple),
            features: FeatureConfig {
                feature_set: FeatureSet::ThreeFeature,
                decay_strategy: DecayRateStrategy::MeanAfterPeak,
                observation_months: None,
            },
            labeling: LabelConfig {
                min_signal: 5.0,
                anchor: LabelAnchor::RiseStart,
                month_counting: MonthCounting::Calendar,
            },
            knn: KnnConfig {
                k: 5,
                weighting: Weighting::Distance,
            },
            scorer: ScorerConfig::default(),
        }
    }

    /// Smoothed series, strict 1% tail death, `word_length,
    /// max_rising_slope, initial_volatility, initial_decay_rate` over the
    /// first year, 30-day months from rise start, uniform k-NN.
    pub fn four_feature() -> Self {
        Self {
            preprocess: PreprocessConfig::smoothed(),
            boundary: BoundaryConfig::with_policy(DeathPolicy::StrictTail),
            features: FeatureConfig {
                feature_set: FeatureSet::FourFeature,
                decay_strategy: DecayRateStrategy::PostPeakSlope,
                observation_months: Some(12),
            },
            labeling: LabelConfig {
                min_signal: 10.0,
                anchor: LabelAnchor::RiseStart,
                month_counting: MonthCounting::ThirtyDay,
            },
            knn: KnnConfig {
                k: 5,
                weighting: Weighting::Uniform,
            },
            scorer: ScorerConfig::default(),
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| LifetimeError::Serialization(e.to_string()))
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            LifetimeError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.preprocess.validate()?;
        self.boundary.validate()?;
        self.labeling.validate()?;
        self.knn.validate()?;
        self.scorer.validate()?;
        if self.features.observation_months == Some(0) {
            return Err(LifetimeError::InvalidParameter(
                "features.observation_months must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
