//! Training corpus construction and persistence.

use crate::config::PipelineConfig;
use crate::core::{LifetimeLabel, TimeSeries, TrainingRow, TrendTable};
use crate::detection::{BoundaryConfig, SeriesAnalysis};
use crate::error::{LifetimeError, Result};
use crate::features::{DecayRateStrategy, FeatureExtractor, FeatureSchema, FeatureVector};
use crate::labeling::lifetime::LifetimeLabeler;
use crate::transform::Preprocessor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Labelled rows sharing one feature schema, unique by word.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCorpus {
    schema: FeatureSchema,
    decay_strategy: DecayRateStrategy,
    rows: Vec<TrainingRow>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct CorpusRecord {
    word: String,
    features: Vec<f64>,
    label: LifetimeLabel,
}

#[derive(Serialize, Deserialize)]
struct CorpusFile {
    schema: FeatureSchema,
    decay_strategy: DecayRateStrategy,
    rows: Vec<CorpusRecord>,
}

impl TrainingCorpus {
    pub fn new(schema: FeatureSchema, decay_strategy: DecayRateStrategy) -> Self {
        Self {
            schema,
            decay_strategy,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn decay_strategy(&self) -> DecayRateStrategy {
        self.decay_strategy
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in insertion order, ongoing rows included.
    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    /// Rows with a numeric label.
    pub fn labelled_rows(&self) -> impl Iterator<Item = &TrainingRow> {
        self.rows.iter().filter(|r| r.is_labelled())
    }

    pub fn get(&self, word: &str) -> Option<&TrainingRow> {
        self.index.get(word).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Insert a row, replacing (in place) any existing row for the same word.
    ///
    /// Returns the replaced row.
    pub fn insert(&mut self, row: TrainingRow) -> Result<Option<TrainingRow>> {
        self.schema.ensure_matches(row.features.schema())?;
        match self.index.get(&row.word) {
            Some(&i) => Ok(Some(std::mem::replace(&mut self.rows[i], row))),
            None => {
                self.index.insert(row.word.clone(), self.rows.len());
                self.rows.push(row);
                Ok(None)
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let file = CorpusFile {
            schema: self.schema.clone(),
            decay_strategy: self.decay_strategy,
            rows: self
                .rows
                .iter()
                .map(|r| CorpusRecord {
                    word: r.word.clone(),
                    features: r.features.values().to_vec(),
                    label: r.label,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CorpusFile = serde_json::from_str(json)?;
        let mut corpus = Self::new(file.schema, file.decay_strategy);
        for record in file.rows {
            let features = FeatureVector::new(corpus.schema.clone(), record.features)?;
            corpus.insert(TrainingRow::new(record.word, features, record.label))?;
        }
        Ok(corpus)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Builds training rows from historical series.
///
/// Labels always come from the full series; features honour the
/// extractor's observation window.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    preprocessor: Preprocessor,
    boundary: BoundaryConfig,
    extractor: FeatureExtractor,
    labeler: LifetimeLabeler,
}

impl CorpusBuilder {
    pub fn new(
        preprocessor: Preprocessor,
        boundary: BoundaryConfig,
        extractor: FeatureExtractor,
        labeler: LifetimeLabeler,
    ) -> Self {
        Self {
            preprocessor,
            boundary,
            extractor,
            labeler,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let preprocessor = Preprocessor::new(config.preprocess.clone());
        Self::new(
            preprocessor.clone(),
            config.boundary.clone(),
            FeatureExtractor::new(config.features.clone(), preprocessor, config.boundary.clone()),
            LifetimeLabeler::new(config.labeling.clone()),
        )
    }

    pub fn schema(&self) -> FeatureSchema {
        self.extractor.schema()
    }

    /// Build the row for one term, or `None` if the term is excluded.
    pub fn build_row(&self, word: &str, series: &TimeSeries) -> Result<Option<TrainingRow>> {
        let analysis = match SeriesAnalysis::analyze(series, &self.preprocessor, &self.boundary) {
            Ok(a) => a,
            Err(e) if e.is_insufficient_data() => {
                debug!(word, error = %e, "skipping term without data");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(label) = self.labeler.label(&analysis) else {
            debug!(
                word,
                peak = analysis.boundaries.peak.value,
                "peak below minimum signal; excluded"
            );
            return Ok(None);
        };

        let features = if self.extractor.config().observation_months.is_some() {
            self.extractor.extract_features(word, series)?
        } else {
            self.extractor.compute(word, &analysis)
        };

        Ok(Some(TrainingRow::new(word, features, label)))
    }

    /// Build a corpus from every term of a table, in column order.
    pub fn build_from_table(&self, table: &TrendTable) -> Result<TrainingCorpus> {
        let mut corpus = TrainingCorpus::new(self.schema(), self.extractor.decay_strategy());
        let mut excluded = 0usize;

        for (term, series) in table.iter() {
            let series = series?;
            match self.build_row(term, &series)? {
                Some(row) => {
                    if corpus.insert(row)?.is_some() {
                        warn!(term, "duplicate term in table; keeping the last row");
                    }
                }
                None => excluded += 1,
            }
        }

        let ongoing = corpus.rows().iter().filter(|r| !r.is_labelled()).count();
        info!(
            rows = corpus.len(),
            ongoing,
            excluded,
            schema = %corpus.schema().describe(),
            "built training corpus"
        );

        if corpus.is_empty() {
            return Err(LifetimeError::InsufficientData {
                needed: 1,
                got: 0,
            });
        }
        Ok(corpus)
    }
}
