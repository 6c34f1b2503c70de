//! Persisted model artifacts: scaler, scaled reference matrix, words and
//! labels, always loaded and validated together.

use crate::core::LifetimeLabel;
use crate::error::{LifetimeError, Result};
use crate::features::{DecayRateStrategy, FeatureKind, FeatureSchema};
use crate::labeling::TrainingCorpus;
use crate::transform::StandardizationState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Everything the predictor needs at serving time.
///
/// Row `i` of `scaled_matrix` belongs to `words[i]` and `labels[i]`. Ongoing
/// rows are kept for word lookup but never serve as neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifacts {
    schema: FeatureSchema,
    decay_strategy: DecayRateStrategy,
    scaler: StandardizationState,
    words: Vec<String>,
    scaled_matrix: Vec<Vec<f64>>,
    labels: Vec<LifetimeLabel>,
}

impl ModelArtifacts {
    /// Fit the scaler over every corpus row and scale the reference matrix.
    pub fn fit(corpus: &TrainingCorpus) -> Result<Self> {
        if corpus.labelled_rows().next().is_none() {
            return Err(LifetimeError::InsufficientData {
                needed: 1,
                got: 0,
            });
        }
        let rows: Vec<&[f64]> = corpus.rows().iter().map(|r| r.features.values()).collect();
        let scaler = StandardizationState::fit(corpus.schema(), &rows)?;
        let scaled_matrix = rows
            .iter()
            .map(|r| scaler.transform(r))
            .collect::<Result<Vec<_>>>()?;

        let artifacts = Self {
            schema: corpus.schema().clone(),
            decay_strategy: corpus.decay_strategy(),
            scaler,
            words: corpus.rows().iter().map(|r| r.word.clone()).collect(),
            scaled_matrix,
            labels: corpus.rows().iter().map(|r| r.label).collect(),
        };
        info!(
            rows = artifacts.len(),
            labelled = artifacts.labelled_count(),
            schema = %artifacts.schema.describe(),
            decay_strategy = %artifacts.decay_strategy,
            "fitted model artifacts"
        );
        Ok(artifacts)
    }

    /// Check that all parts line up. Any inconsistency is a configuration
    /// error.
    pub fn validate(&self) -> Result<()> {
        let n = self.words.len();
        if n == 0 {
            return Err(LifetimeError::Configuration(
                "model artifacts contain no reference rows".to_string(),
            ));
        }
        if self.scaled_matrix.len() != n || self.labels.len() != n {
            return Err(LifetimeError::Configuration(format!(
                "artifact parts disagree: {} words, {} matrix rows, {} labels",
                n,
                self.scaled_matrix.len(),
                self.labels.len()
            )));
        }
        self.schema
            .ensure_matches(self.scaler.schema())
            .map_err(|e| LifetimeError::Configuration(format!("scaler schema: {}", e)))?;
        self.scaler.validate()?;

        let width = self.schema.len();
        if let Some((i, row)) = self
            .scaled_matrix
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width || r.iter().any(|v| !v.is_finite()))
        {
            return Err(LifetimeError::Configuration(format!(
                "reference row {} ('{}') has {} values, expected {} finite values",
                i,
                self.words[i],
                row.len(),
                width
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        if let Some(dup) = self.words.iter().find(|w| !seen.insert(w.as_str())) {
            return Err(LifetimeError::Configuration(format!(
                "duplicate reference word '{}'",
                dup
            )));
        }
        if self.labelled_count() == 0 {
            return Err(LifetimeError::Configuration(
                "model artifacts contain no labelled rows".to_string(),
            ));
        }
        Ok(())
    }

    /// Fail unless these artifacts were built for `schema` and, when the
    /// schema carries a decay feature, for `strategy`.
    pub fn ensure_compatible(
        &self,
        schema: &FeatureSchema,
        strategy: DecayRateStrategy,
    ) -> Result<()> {
        self.schema.ensure_matches(schema)?;
        if self.schema.contains(FeatureKind::InitialDecayRate) && self.decay_strategy != strategy {
            return Err(LifetimeError::StrategyMismatch {
                persisted: self.decay_strategy.tag().to_string(),
                active: strategy.tag().to_string(),
            });
        }
        Ok(())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn decay_strategy(&self) -> DecayRateStrategy {
        self.decay_strategy
    }

    pub fn scaler(&self) -> &StandardizationState {
        &self.scaler
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn labels(&self) -> &[LifetimeLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn labelled_count(&self) -> usize {
        self.labels.iter().filter(|l| !l.is_ongoing()).count()
    }

    /// Row index of a reference word.
    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.iter().position(|w| w == word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.position(word).is_some()
    }

    pub fn scaled_row(&self, index: usize) -> Option<&[f64]> {
        self.scaled_matrix.get(index).map(|r| r.as_slice())
    }

    /// Unscaled features of a reference word.
    pub fn raw_features(&self, word: &str) -> Result<Option<Vec<f64>>> {
        match self.position(word) {
            Some(i) => Ok(Some(self.scaler.inverse_transform(&self.scaled_matrix[i])?)),
            None => Ok(None),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifacts: Self = serde_json::from_str(json).map_err(|e| {
            LifetimeError::Configuration(format!("unreadable model artifacts: {}", e))
        })?;
        artifacts.validate()?;
        Ok(artifacts)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate. A missing file is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LifetimeError::Configuration(format!(
                "model artifacts not found at {}",
                path.display()
            )),
            _ => LifetimeError::from(e),
        })?;
        let artifacts = Self::from_json(&json)?;
        debug!(path = %path.display(), rows = artifacts.len(), "loaded model artifacts");
        Ok(artifacts)
    }
}
