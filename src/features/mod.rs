//! Feature extraction for interest series.
//!
//! Turns a preprocessed series and its boundaries into a fixed-order
//! [`FeatureVector`] describing early popularity dynamics.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use slang_lifespan::core::TimeSeries;
//! use slang_lifespan::features::{FeatureExtractor, FeatureKind};
//!
//! let series = TimeSeries::monthly(
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     vec![0.0, 10.0, 40.0, 100.0, 60.0, 30.0, 10.0, 0.0],
//! )
//! .unwrap();
//!
//! let features = FeatureExtractor::default().extract("갓생", &series).unwrap();
//! assert_eq!(features.get(FeatureKind::WordLength), Some(2.0));
//! ```

pub mod decay;
pub mod extractor;
pub mod schema;
pub mod trend;

pub use decay::DecayRateStrategy;
pub use extractor::{
    initial_volatility, max_rising_slope, word_length, FeatureConfig, FeatureExtractor,
};
pub use schema::{FeatureKind, FeatureSchema, FeatureSet, FeatureVector};
pub use trend::{linear_trend, LinearTrendResult};
