//! Hold-out evaluation of the k-NN predictor.

use crate::core::TrainingRow;
use crate::error::{LifetimeError, Result};
use crate::features::DecayRateStrategy;
use crate::labeling::TrainingCorpus;
use crate::models::artifacts::ModelArtifacts;
use crate::models::knn::{KnnConfig, KnnPredictor};
use crate::utils::{calculate_metrics, AccuracyMetrics};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

/// Shuffle the labelled rows with a fixed seed and split off a test set.
///
/// Ongoing rows are dropped first. The test set holds
/// `ceil(n * test_fraction)` rows; both sides must be non-empty.
pub fn train_test_split(
    rows: &[TrainingRow],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<TrainingRow>, Vec<TrainingRow>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(LifetimeError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut labelled: Vec<TrainingRow> = rows.iter().filter(|r| r.is_labelled()).cloned().collect();
    let n = labelled.len();
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n < 2 || n_test >= n {
        return Err(LifetimeError::InsufficientData { needed: 2, got: n });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    labelled.shuffle(&mut rng);
    let train = labelled.split_off(n_test);
    Ok((train, labelled))
}

/// Outcome of one hold-out evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub metrics: AccuracyMetrics,
    pub n_train: usize,
    pub n_test: usize,
    /// `(word, actual months, predicted months)` per test row.
    pub predictions: Vec<(String, u32, u32)>,
}

/// Fit artifacts on `train` and score predictions for `test`.
pub fn evaluate(
    train: &[TrainingRow],
    test: &[TrainingRow],
    decay_strategy: DecayRateStrategy,
    config: &KnnConfig,
) -> Result<EvaluationReport> {
    let first = train.first().ok_or(LifetimeError::EmptyData)?;
    if test.is_empty() {
        return Err(LifetimeError::EmptyData);
    }

    let mut corpus = TrainingCorpus::new(first.features.schema().clone(), decay_strategy);
    for row in train {
        corpus.insert(row.clone())?;
    }
    let predictor = KnnPredictor::new(Arc::new(ModelArtifacts::fit(&corpus)?), config.clone())?;

    let mut predictions = Vec::with_capacity(test.len());
    for row in test {
        let Some(actual) = row.label.months() else {
            continue;
        };
        let p = predictor.predict_vector(&row.word, &row.features)?;
        predictions.push((row.word.clone(), actual, p.predicted_months));
    }

    let actual: Vec<f64> = predictions.iter().map(|p| p.1 as f64).collect();
    let predicted: Vec<f64> = predictions.iter().map(|p| p.2 as f64).collect();
    let metrics = calculate_metrics(&actual, &predicted)?;

    info!(
        n_train = train.len(),
        n_test = predictions.len(),
        rmse = metrics.rmse,
        r_squared = metrics.r_squared,
        "evaluated k-NN predictor"
    );

    Ok(EvaluationReport {
        metrics,
        n_train: train.len(),
        n_test: predictions.len(),
        predictions,
    })
}
