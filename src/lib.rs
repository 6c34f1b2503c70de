//! # slang-lifespan
//!
//! Lifetime estimation for slang terms from search-interest series.
//!
//! A raw interest series is preprocessed, its peak, rise start and death
//! point are located, and early-dynamics features are extracted. Historical
//! terms whose lifecycle has completed get a lifetime label in months; a
//! standardized k-nearest-neighbour model over those labelled rows predicts
//! the lifetime of a new or reference term. A separate scorer estimates how
//! likely a word is to be a neologism at all.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod classify;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod features;
pub mod labeling;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{LifetimeError, Result};

pub mod prelude {
    pub use crate::classify::{DictionaryLookup, NeologismScore, NeologismScorer};
    pub use crate::config::PipelineConfig;
    pub use crate::core::{LifetimeLabel, TimeSeries, TrainingRow, TrendTable};
    pub use crate::detection::{Boundaries, SeriesAnalysis};
    pub use crate::error::{LifetimeError, Result};
    pub use crate::features::{FeatureExtractor, FeatureSchema, FeatureVector};
    pub use crate::labeling::{CorpusBuilder, TrainingCorpus};
    pub use crate::models::{KnnPredictor, ModelArtifacts, Prediction};
    pub use crate::pipeline::{Assessment, LifetimeReport, LifetimeService, LifetimeStatus};
}
