//! Lifetime prediction models.

pub mod artifacts;
pub mod evaluation;
pub mod knn;

pub use artifacts::ModelArtifacts;
pub use evaluation::{evaluate, train_test_split, EvaluationReport};
pub use knn::{euclidean_distance, KnnConfig, KnnPredictor, Neighbor, Prediction, Weighting};
