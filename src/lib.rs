//! # salescope
//!
//! Explorer for a tabular sales dataset: narrow it by categorical filters,
//! then view it through derived lenses (grouped totals, pivoted matrices,
//! correlation structure, missing-data and outlier reports).
//!
//! ```text
//!  .csv / .json upload
//!        │
//!        ▼
//!   data::loader  ──►  Dataset (typed, calendar fields derived)
//!        │
//!        ▼
//!   data::filter  ──►  FilteredFrame | Empty
//!        │
//!        ▼
//!   analysis::{aggregate, pivot, correlate, quality, rank}
//!        │
//!        ▼
//!   view::build_view  ──►  plain tables for any renderer
//! ```
//!
//! All analysis is a pure function of the filtered frame; the only state
//! across interactions is the [`session::Session`]'s fingerprint-keyed parse
//! cache and the current filter selections.

pub mod analysis;
pub mod data;
pub mod render;
pub mod session;
pub mod view;

pub use data::filter::{FilterOutcome, FilterSpec, FilteredFrame};
pub use data::model::{Dataset, Dimension, Measure, Record};
pub use data::DataError;
pub use session::Session;
pub use view::{build_view, ViewPage, ViewReport};
