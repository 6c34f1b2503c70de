//! Combined neologism likelihood.

use crate::classify::dictionary::{dictionary_score, DictionaryLookup};
use crate::classify::morphology::morphology_score;
use crate::classify::trend_score::{trend_score, TrendScoreConfig};
use crate::core::TimeSeries;
use crate::error::{LifetimeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Sub-score weights and decision threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub dictionary_weight: f64,
    pub trend_weight: f64,
    pub morphology_weight: f64,
    /// Final scores strictly above this are neologisms.
    pub threshold: f64,
    pub trend: TrendScoreConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            dictionary_weight: 0.4,
            trend_weight: 0.4,
            morphology_weight: 0.2,
            threshold: 0.6,
            trend: TrendScoreConfig::default(),
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("dictionary_weight", self.dictionary_weight),
            ("trend_weight", self.trend_weight),
            ("morphology_weight", self.morphology_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(LifetimeError::InvalidParameter(format!(
                    "{} must be non-negative, got {}",
                    name, w
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(LifetimeError::InvalidParameter(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        self.trend.validate()
    }
}

/// The three independent signals, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub dict: f64,
    pub trend: f64,
    pub morph: f64,
}

/// Outcome of scoring one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeologismScore {
    pub word: String,
    pub final_score: f64,
    pub is_neologism: bool,
    pub subscores: SubScores,
}

/// Scores how likely a word is a new coinage.
///
/// Each signal degrades to a neutral value on its own; scoring never fails.
#[derive(Clone, Default)]
pub struct NeologismScorer {
    config: ScorerConfig,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
}

impl fmt::Debug for NeologismScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeologismScorer")
            .field("config", &self.config)
            .field("has_dictionary", &self.dictionary.is_some())
            .finish()
    }
}

impl NeologismScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            config,
            dictionary: None,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionaryLookup>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score `word`, using `series` for the trend signal when given.
    pub fn score(&self, word: &str, series: Option<&TimeSeries>) -> NeologismScore {
        let subscores = SubScores {
            dict: dictionary_score(self.dictionary.as_deref(), word),
            trend: series
                .map(|s| trend_score(s, &self.config.trend))
                .unwrap_or(0.0),
            morph: morphology_score(word),
        };

        let final_score = self.config.dictionary_weight * subscores.dict
            + self.config.trend_weight * subscores.trend
            + self.config.morphology_weight * subscores.morph;
        let is_neologism = final_score > self.config.threshold;

        debug!(
            word,
            final_score,
            is_neologism,
            dict = subscores.dict,
            trend = subscores.trend,
            morph = subscores.morph,
            "scored word"
        );

        NeologismScore {
            word: word.to_string(),
            final_score,
            is_neologism,
            subscores,
        }
    }
}
