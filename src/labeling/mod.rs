//! Historical lifetime labels and training-corpus construction.

pub mod corpus;
pub mod lifetime;

pub use corpus::{CorpusBuilder, TrainingCorpus};
pub use lifetime::{months_between, LabelAnchor, LabelConfig, LifetimeLabeler, MonthCounting};
