//! Data layer: schema, core types, loading, filtering, and export.
//!
//! ```text
//!  .csv / .json
//!       │
//!       ▼
//!  ┌──────────┐
//!  │  loader   │  parse + derive calendar fields → Dataset
//!  └──────────┘
//!       │
//!       ▼
//!  ┌──────────┐
//!  │  Dataset  │  Vec<Record>, distinct-value index
//!  └──────────┘
//!       │
//!       ▼
//!  ┌──────────┐
//!  │  filter   │  FilterSpec → FilteredFrame | Empty
//!  └──────────┘
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;

use thiserror::Error;

use schema::Column;

/// Errors raised while loading or exporting a dataset.
///
/// Load errors are fatal for the whole load: a single bad row rejects the
/// file rather than silently biasing every downstream aggregate.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("required column '{0}' is missing from the input")]
    Schema(Column),

    #[error("row {row}: cannot parse {column} value '{value}'")]
    Parse {
        row: usize,
        column: Column,
        value: String,
    },

    #[error("row {row}: revenue_usd is negative ({value})")]
    NegativeRevenue { row: usize, value: f64 },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("reading input")]
    Io(#[from] std::io::Error),

    #[error("reading CSV")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: {message}")]
    JsonShape { row: usize, message: String },
}
