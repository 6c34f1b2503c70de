//! Serving façade: one call from a word (and optionally its live series) to
//! a lifetime assessment.

use crate::classify::DictionaryLookup;
use crate::config::PipelineConfig;
use crate::core::TimeSeries;
use crate::detection::SeriesAnalysis;
use crate::error::Result;
use crate::features::{FeatureExtractor, FeatureSchema};
use crate::models::{KnnPredictor, ModelArtifacts, Prediction};
use crate::transform::Preprocessor;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Predicted lifetimes at or below this many months are imminent.
const IMMINENT_MONTHS: u32 = 6;

/// Display bucket for a predicted lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifetimeStatus {
    /// Predicted 0 months.
    Expired,
    /// 1 to 6 months left.
    Imminent,
    Alive,
}

impl LifetimeStatus {
    pub fn from_months(months: u32) -> Self {
        match months {
            0 => LifetimeStatus::Expired,
            m if m <= IMMINENT_MONTHS => LifetimeStatus::Imminent,
            _ => LifetimeStatus::Alive,
        }
    }
}

/// Where the query features came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    /// Stored features of a word already in the reference table.
    Reference,
    /// Extracted from the caller's live series.
    Live,
}

/// A completed prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeReport {
    pub word: String,
    pub predicted_months: u32,
    pub status: LifetimeStatus,
    pub neighbor_words: Vec<String>,
    pub neighbor_distances: Vec<f64>,
    pub feature_source: FeatureSource,
    /// Unscaled query features in schema order.
    pub features: Vec<f64>,
}

/// Outcome of assessing one word.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assessment {
    /// The word is in the standard dictionary and is not expected to die.
    StandardWord { word: String },
    /// Not enough signal to place the word among the reference terms.
    InsufficientData { word: String },
    Predicted(LifetimeReport),
}

/// Stateless lifetime service over read-only artifacts.
///
/// Cheap to clone and safe to share across request threads.
#[derive(Clone)]
pub struct LifetimeService {
    extractor: FeatureExtractor,
    predictor: KnnPredictor,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
}

impl fmt::Debug for LifetimeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeService")
            .field("extractor", &self.extractor)
            .field("predictor", &self.predictor)
            .field("has_dictionary", &self.dictionary.is_some())
            .finish()
    }
}

impl LifetimeService {
    /// Build a service, checking the artifacts against the configuration.
    pub fn new(config: &PipelineConfig, artifacts: Arc<ModelArtifacts>) -> Result<Self> {
        config.validate()?;
        artifacts.ensure_compatible(&config.features.schema(), config.features.decay_strategy)?;

        let extractor = FeatureExtractor::new(
            config.features.clone(),
            Preprocessor::new(config.preprocess.clone()),
            config.boundary.clone(),
        );
        let predictor = KnnPredictor::new(artifacts, config.knn.clone())?;

        info!(
            reference_rows = predictor.artifacts().len(),
            k = config.knn.k,
            schema = %config.features.schema().describe(),
            "lifetime service ready"
        );
        Ok(Self {
            extractor,
            predictor,
            dictionary: None,
        })
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionaryLookup>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Feature schema of the live extractor and the artifacts.
    pub fn schema(&self) -> FeatureSchema {
        self.extractor.schema()
    }

    /// The predictor over the loaded artifacts.
    pub fn predictor(&self) -> &KnnPredictor {
        &self.predictor
    }

    /// Assess `word`.
    ///
    /// Standard words short-circuit. Reference words use their stored
    /// features and never count as their own neighbour. Other words need a
    /// live series with measurable interest.
    pub fn assess(&self, word: &str, live_series: Option<&TimeSeries>) -> Result<Assessment> {
        if self.is_standard_word(word) {
            debug!(word, "standard dictionary word");
            return Ok(Assessment::StandardWord {
                word: word.to_string(),
            });
        }

        let artifacts = self.predictor.artifacts();
        let (prediction, features, source) = match artifacts.position(word) {
            Some(i) => {
                let Some(scaled) = artifacts.scaled_row(i) else {
                    return Ok(self.insufficient(word));
                };
                let raw = artifacts.scaler().inverse_transform(scaled)?;
                let prediction = self.predictor.predict_scaled(word, scaled);
                (prediction, raw, FeatureSource::Reference)
            }
            None => {
                let Some(series) = live_series else {
                    return Ok(self.insufficient(word));
                };
                let analysis = match self.extractor.analyze(series) {
                    Ok(a) => a,
                    Err(e) if e.is_insufficient_data() => return Ok(self.insufficient(word)),
                    Err(e) => return Err(e),
                };
                if analysis.boundaries.is_dead_on_arrival() {
                    return Ok(self.insufficient(word));
                }
                let vector = self.extractor.compute(word, &analysis);
                let prediction = self.predictor.predict_vector(word, &vector);
                (prediction, vector.into_values(), FeatureSource::Live)
            }
        };

        let prediction = match prediction {
            Ok(p) => p,
            Err(e) if e.is_insufficient_data() => return Ok(self.insufficient(word)),
            Err(e) => return Err(e),
        };
        Ok(Assessment::Predicted(self.report(word, prediction, features, source)))
    }

    /// Analyse a live series the way [`assess`](Self::assess) would.
    pub fn analyze(&self, series: &TimeSeries) -> Result<SeriesAnalysis> {
        self.extractor.analyze(series)
    }

    fn is_standard_word(&self, word: &str) -> bool {
        let Some(dictionary) = self.dictionary.as_deref() else {
            return false;
        };
        match dictionary.is_standard(word) {
            Ok(standard) => standard,
            Err(e) => {
                warn!(word, error = %e, "dictionary lookup failed; treating as non-standard");
                false
            }
        }
    }

    fn insufficient(&self, word: &str) -> Assessment {
        debug!(word, "insufficient data for prediction");
        Assessment::InsufficientData {
            word: word.to_string(),
        }
    }

    fn report(
        &self,
        word: &str,
        prediction: Prediction,
        features: Vec<f64>,
        feature_source: FeatureSource,
    ) -> LifetimeReport {
        let status = LifetimeStatus::from_months(prediction.predicted_months);
        info!(
            word,
            months = prediction.predicted_months,
            ?status,
            ?feature_source,
            "predicted lifetime"
        );
        LifetimeReport {
            word: word.to_string(),
            predicted_months: prediction.predicted_months,
            status,
            neighbor_words: prediction.neighbor_words,
            neighbor_distances: prediction.neighbor_distances,
            feature_source,
            features,
        }
    }
}
