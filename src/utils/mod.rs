//! Utility functions shared by extraction, labelling and evaluation.

pub mod metrics;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use stats::{finite_or_zero, mean, population_std_dev, std_dev};
