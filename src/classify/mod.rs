//! Neologism likelihood scoring.
//!
//! Combines a dictionary signal, a trend signal and a word-shape signal.
//! Independent of lifetime prediction.

pub mod dictionary;
pub mod morphology;
pub mod scorer;
pub mod trend_score;

pub use dictionary::{dictionary_score, DictionaryLookup, StaticDictionary};
pub use morphology::morphology_score;
pub use scorer::{NeologismScore, NeologismScorer, ScorerConfig, SubScores};
pub use trend_score::{trend_score, TrendScoreConfig};
