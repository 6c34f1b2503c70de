//! Boundary detection for interest series.
//!
//! Locates the peak, the start of the rise and the point at which a trend
//! is judged to have died.

mod boundary;

pub use boundary::{
    find_peak, locate_boundaries, rise_start, simple_death, strict_tail_death, BoundaryConfig,
    Boundaries, DeathPolicy, Peak, SeriesAnalysis,
};
