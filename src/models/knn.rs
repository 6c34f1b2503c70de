//! Distance-scaled k-nearest-neighbour lifetime prediction.
//!
//! Queries are standardized with the persisted scaler, compared to every
//! labelled reference row by Euclidean distance, and the K closest labels
//! are averaged. A query word that is itself a reference word never counts
//! as its own neighbour.

use crate::error::{LifetimeError, Result};
use crate::features::FeatureVector;
use crate::models::artifacts::ModelArtifacts;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Neighbour weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Arithmetic mean of the neighbour labels.
    #[default]
    Uniform,
    /// Inverse-distance weighted mean. Neighbours at distance 0 take all
    /// the weight.
    Distance,
}

/// Predictor options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub k: usize,
    pub weighting: Weighting,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 5,
            weighting: Weighting::Uniform,
        }
    }
}

impl KnnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(LifetimeError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A reference row close to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub word: String,
    pub distance: f64,
    pub months: u32,
}

/// Predicted lifetime and the neighbours it was averaged from, closest
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub predicted_months: u32,
    pub neighbor_words: Vec<String>,
    pub neighbor_distances: Vec<f64>,
}

/// Euclidean distance between equal-length vectors; infinite otherwise.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// k-NN regressor over validated model artifacts.
#[derive(Debug, Clone)]
pub struct KnnPredictor {
    artifacts: Arc<ModelArtifacts>,
    config: KnnConfig,
}

impl KnnPredictor {
    pub fn new(artifacts: Arc<ModelArtifacts>, config: KnnConfig) -> Result<Self> {
        config.validate()?;
        artifacts.validate()?;
        Ok(Self { artifacts, config })
    }

    /// The reference rows this predictor searches.
    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Neighbour count and weighting in use.
    pub fn config(&self) -> &KnnConfig {
        &self.config
    }

    /// Predict from raw features laid out in the artifacts' schema order.
    pub fn predict(&self, word: &str, raw_features: &[f64]) -> Result<Prediction> {
        let scaled = self.artifacts.scaler().transform(raw_features)?;
        self.predict_scaled(word, &scaled)
    }

    /// Predict from a feature vector, checking its schema first.
    pub fn predict_vector(&self, word: &str, features: &FeatureVector) -> Result<Prediction> {
        let scaled = self.artifacts.scaler().transform_vector(features)?;
        self.predict_scaled(word, &scaled)
    }

    /// Predict from an already standardized query.
    pub fn predict_scaled(&self, word: &str, scaled: &[f64]) -> Result<Prediction> {
        let neighbors = self.nearest(word, scaled)?;
        let predicted = self.aggregate(&neighbors);

        Ok(Prediction {
            predicted_months: predicted,
            neighbor_words: neighbors.iter().map(|n| n.word.clone()).collect(),
            neighbor_distances: neighbors.iter().map(|n| n.distance).collect(),
        })
    }

    /// The K labelled reference rows closest to `scaled`, excluding the row
    /// of `word` itself. Ties keep reference order.
    pub fn nearest(&self, word: &str, scaled: &[f64]) -> Result<Vec<Neighbor>> {
        if scaled.len() != self.artifacts.schema().len() {
            return Err(LifetimeError::SchemaMismatch {
                expected: self.artifacts.schema().describe(),
                got: format!("{} unnamed values", scaled.len()),
            });
        }

        let words = self.artifacts.words();
        let labels = self.artifacts.labels();
        let mut candidates: Vec<Neighbor> = (0..self.artifacts.len())
            .filter(|&i| words[i] != word)
            .filter_map(|i| {
                let months = labels[i].months()?;
                let row = self.artifacts.scaled_row(i)?;
                Some(Neighbor {
                    word: words[i].clone(),
                    distance: euclidean_distance(scaled, row),
                    months,
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(LifetimeError::InsufficientData {
                needed: 1,
                got: 0,
            });
        }

        candidates.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        candidates.truncate(self.config.k);
        Ok(candidates)
    }

    fn aggregate(&self, neighbors: &[Neighbor]) -> u32 {
        let mean = match self.config.weighting {
            Weighting::Uniform => {
                neighbors.iter().map(|n| n.months as f64).sum::<f64>() / neighbors.len() as f64
            }
            Weighting::Distance => {
                let exact: Vec<&Neighbor> =
                    neighbors.iter().filter(|n| n.distance == 0.0).collect();
                if !exact.is_empty() {
                    exact.iter().map(|n| n.months as f64).sum::<f64>() / exact.len() as f64
                } else {
                    let (num, den) = neighbors.iter().fold((0.0, 0.0), |(num, den), n| {
                        let w = 1.0 / n.distance;
                        (num + w * n.months as f64, den + w)
                    });
                    num / den
                }
            }
        };

        if mean.is_finite() {
            mean.round().max(0.0) as u32
        } else {
            0
        }
    }
}
