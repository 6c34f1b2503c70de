//! Data transformations: zero-fill/smoothing preprocessing, trailing windows
//! and feature standardization.
//!
//! # Example
//!
//! ```
//! use slang_lifespan::transform::rolling_mean;
//!
//! let smoothed = rolling_mean(&[0.0, 30.0, 60.0, 90.0], 3, 1);
//! assert_eq!(smoothed[3], 60.0);
//! ```

pub mod preprocess;
pub mod scale;
pub mod window;

pub use preprocess::{PreprocessConfig, Preprocessor};
pub use scale::StandardizationState;
pub use window::rolling_mean;
