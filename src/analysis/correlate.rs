use crate::data::filter::FilteredFrame;
use crate::data::model::Measure;

use super::AnalysisError;

// ---------------------------------------------------------------------------
// CorrelationMatrix – pairwise Pearson coefficients over numeric columns
// ---------------------------------------------------------------------------

/// Square, symmetric matrix of Pearson coefficients, indexed by measure.
///
/// A cell is `None` when the coefficient is undefined: fewer than two
/// retained rows, or zero variance in either column. Defined diagonal
/// entries are exactly 1.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    measures: Vec<Measure>,
    cells: Vec<Option<f64>>,
    /// Rows surviving listwise deletion.
    pub retained: usize,
}

impl CorrelationMatrix {
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells[i * self.measures.len() + j]
    }
}

/// Compute the correlation matrix over the given measures.
///
/// Listwise deletion: a record contributes only if *every* selected measure
/// is non-null for it; a single null drops the record from the whole
/// computation, not just from the pairs involving that column.
pub fn correlation(
    frame: &FilteredFrame<'_>,
    measures: &[Measure],
) -> Result<CorrelationMatrix, AnalysisError> {
    if measures.len() < 2 {
        return Err(AnalysisError::TooFewMeasures(measures.len()));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); measures.len()];
    'rows: for record in frame.records() {
        let mut row = Vec::with_capacity(measures.len());
        for m in measures {
            match m.value(record) {
                Some(v) => row.push(v),
                None => continue 'rows,
            }
        }
        for (col, v) in columns.iter_mut().zip(row) {
            col.push(v);
        }
    }

    let n = columns[0].len();
    let k = measures.len();
    let mut cells = vec![None; k * k];

    if n >= 2 {
        let means: Vec<f64> = columns
            .iter()
            .map(|c| c.iter().sum::<f64>() / n as f64)
            .collect();
        // Population moments; the n factors cancel in the ratio, the point
        // is using the same convention in numerator and denominator.
        let stds: Vec<f64> = columns
            .iter()
            .zip(&means)
            .map(|(c, mean)| {
                (c.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
            })
            .collect();

        for i in 0..k {
            for j in i..k {
                let value = if stds[i] == 0.0 || stds[j] == 0.0 {
                    None
                } else if i == j {
                    Some(1.0)
                } else {
                    let cov = columns[i]
                        .iter()
                        .zip(&columns[j])
                        .map(|(a, b)| (a - means[i]) * (b - means[j]))
                        .sum::<f64>()
                        / n as f64;
                    Some((cov / (stds[i] * stds[j])).clamp(-1.0, 1.0))
                };
                cells[i * k + j] = value;
                cells[j * k + i] = value;
            }
        }
    }

    Ok(CorrelationMatrix {
        measures: measures.to_vec(),
        cells,
        retained: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::testkit::record;

    fn frame(records: &[Record]) -> FilteredFrame<'_> {
        FilteredFrame::from_records(records.iter().collect())
    }

    fn rec(revenue: f64, units: f64, rating: Option<f64>) -> Record {
        let mut r = record("2022-01-15", "Europe", "Smartphone", Some(revenue));
        r.units_sold = Some(units);
        r.customer_rating = rating;
        r
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        let records = vec![
            rec(100.0, 1.0, Some(4.0)),
            rec(200.0, 2.0, Some(4.5)),
            rec(300.0, 3.0, Some(3.5)),
        ];
        let m = correlation(&frame(&records), &[Measure::Revenue, Measure::UnitsSold]).unwrap();
        assert_eq!(m.retained, 3);
        let c = m.get(0, 1).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let records = vec![
            rec(100.0, 3.0, Some(4.0)),
            rec(200.0, 1.0, Some(3.0)),
            rec(150.0, 2.0, Some(5.0)),
        ];
        let measures = [Measure::Revenue, Measure::UnitsSold, Measure::Rating];
        let m = correlation(&frame(&records), &measures).unwrap();
        for i in 0..3 {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn listwise_deletion_drops_the_whole_record() {
        let records = vec![
            rec(100.0, 1.0, Some(4.0)),
            rec(200.0, 2.0, None), // null rating drops this row entirely
            rec(300.0, 3.0, Some(3.5)),
        ];
        let measures = [Measure::Revenue, Measure::UnitsSold, Measure::Rating];
        let m = correlation(&frame(&records), &measures).unwrap();
        assert_eq!(m.retained, 2);
    }

    #[test]
    fn fewer_than_two_retained_rows_is_undefined() {
        let records = vec![rec(100.0, 1.0, None), rec(200.0, 2.0, None)];
        let measures = [Measure::Revenue, Measure::Rating];
        let m = correlation(&frame(&records), &measures).unwrap();
        assert_eq!(m.retained, 0);
        assert_eq!(m.get(0, 0), None);
        assert_eq!(m.get(0, 1), None);
    }

    #[test]
    fn zero_variance_column_is_undefined_even_on_the_diagonal() {
        let records = vec![
            rec(100.0, 2.0, Some(4.0)),
            rec(200.0, 2.0, Some(3.0)),
            rec(300.0, 2.0, Some(5.0)),
        ];
        let m = correlation(&frame(&records), &[Measure::Revenue, Measure::UnitsSold]).unwrap();
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(1, 1), None);
        assert_eq!(m.get(0, 1), None);
    }

    #[test]
    fn a_single_measure_is_rejected() {
        let records = vec![rec(100.0, 1.0, Some(4.0))];
        assert_eq!(
            correlation(&frame(&records), &[Measure::Revenue]).unwrap_err(),
            AnalysisError::TooFewMeasures(1)
        );
    }

    #[test]
    fn empty_frame_yields_all_undefined() {
        let records: Vec<Record> = Vec::new();
        let m = correlation(&frame(&records), &[Measure::Revenue, Measure::UnitsSold]).unwrap();
        assert_eq!(m.retained, 0);
        assert_eq!(m.get(0, 1), None);
    }
}
