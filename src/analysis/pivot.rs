use crate::data::filter::FilteredFrame;
use crate::data::model::Dimension;

use super::aggregate::{GroupKey, GroupedMetric};
use super::AnalysisError;

// ---------------------------------------------------------------------------
// PivotMatrix – dense row × column reshaping of a two-dimension grouping
// ---------------------------------------------------------------------------

/// A dense 2D table over the distinct values of two dimensions.
///
/// Axes come from the *frame*, not from the keys present in the metric, so a
/// combination with zero matching records still gets its cell. Absent
/// combinations are filled per aggregate kind: zero for additive aggregates,
/// undefined for non-additive ones.
#[derive(Debug, Clone)]
pub struct PivotMatrix {
    pub row_dim: Dimension,
    pub col_dim: Dimension,
    rows: Vec<String>,
    cols: Vec<String>,
    cells: Vec<Option<f64>>,
}

impl PivotMatrix {
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn cols(&self) -> &[String] {
        &self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.cols.len() + col]
    }
}

/// Reshape a two-dimension [`GroupedMetric`] into a dense matrix. The
/// metric's primary dimension becomes the rows.
pub fn pivot(
    frame: &FilteredFrame<'_>,
    metric: &GroupedMetric,
) -> Result<PivotMatrix, AnalysisError> {
    let Some(col_dim) = metric.secondary_dim else {
        return Err(AnalysisError::PivotNeedsTwoDimensions);
    };
    let row_dim = metric.primary_dim;

    let rows = frame.distinct(row_dim);
    let cols = frame.distinct(col_dim);
    let fill = if metric.aggregate.is_additive() {
        Some(0.0)
    } else {
        None
    };

    let mut cells = Vec::with_capacity(rows.len() * cols.len());
    for r in &rows {
        for c in &cols {
            let key = GroupKey {
                primary: r.clone(),
                secondary: Some(c.clone()),
            };
            cells.push(metric.get(&key).unwrap_or(fill));
        }
    }

    Ok(PivotMatrix {
        row_dim,
        col_dim,
        rows,
        cols,
        cells,
    })
}
