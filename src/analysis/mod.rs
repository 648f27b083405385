//! Analysis layer: pure functions from a filtered frame to derived views.
//!
//! Every function here is stateless and side-effect free; recomputation on a
//! filter change is a fresh pass over the frame. Undefined results (mean of
//! an all-null group, correlation over too few rows) are carried as `None`
//! rather than coerced to zero, so a renderer can distinguish "no data" from
//! "zero".

pub mod aggregate;
pub mod correlate;
pub mod pivot;
pub mod quality;
pub mod rank;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("pivot requires a grouping over exactly two dimensions")]
    PivotNeedsTwoDimensions,

    #[error("correlation requires at least two measures, got {0}")]
    TooFewMeasures(usize),
}
