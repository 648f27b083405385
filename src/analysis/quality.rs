use crate::data::filter::FilteredFrame;
use crate::data::model::{Measure, Record};
use crate::data::schema::Column;

// ---------------------------------------------------------------------------
// Missing-value report
// ---------------------------------------------------------------------------

/// Missing-value tally for one column of the filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumn {
    pub column: Column,
    pub missing: usize,
    /// Percentage of the filtered row count.
    pub pct: f64,
}

/// Per-column missing-value report over the current filtered set.
///
/// Columns with zero missing values are excluded; a report with nothing to
/// show is the distinct `Complete` signal rather than an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingReport {
    Complete,
    Gaps(Vec<MissingColumn>),
}

fn null_in(record: &Record, column: Column) -> bool {
    match column {
        Column::PreviousDeviceOs => record.previous_device_os.is_none(),
        Column::UnitPriceUsd => record.unit_price_usd.is_none(),
        Column::DiscountPct => record.discount_pct.is_none(),
        Column::DiscountedPriceUsd => record.discounted_price_usd.is_none(),
        Column::UnitsSold => record.units_sold.is_none(),
        Column::RevenueUsd => record.revenue_usd.is_none(),
        Column::CustomerRating => record.customer_rating.is_none(),
        _ => false,
    }
}

/// Count nulls per declared column, sorted by missing count descending.
pub fn missing_report(frame: &FilteredFrame<'_>) -> MissingReport {
    let total = frame.len();
    let mut gaps = Vec::new();

    for column in Column::ALL {
        if !column.nullable() {
            continue;
        }
        let missing = frame.records().iter().filter(|r| null_in(r, column)).count();
        if missing > 0 {
            gaps.push(MissingColumn {
                column,
                missing,
                pct: missing as f64 / total as f64 * 100.0,
            });
        }
    }

    if gaps.is_empty() {
        MissingReport::Complete
    } else {
        gaps.sort_by(|a, b| b.missing.cmp(&a.missing));
        MissingReport::Gaps(gaps)
    }
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics for one numeric column, over non-null values only.
/// Everything but `count` is undefined when no values remain; `std` also
/// needs at least two.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub measure: Measure,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Quantile by linear interpolation between closest ranks; `values` must be
/// sorted and non-empty.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        values[lo]
    } else {
        values[lo] + (pos - lo as f64) * (values[hi] - values[lo])
    }
}

fn stats_of(measure: Measure, mut values: Vec<f64>) -> ColumnStats {
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    if count == 0 {
        return ColumnStats {
            measure,
            count,
            mean: None,
            std: None,
            min: None,
            q1: None,
            median: None,
            q3: None,
            max: None,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count >= 2 {
        let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        Some((ss / (count - 1) as f64).sqrt())
    } else {
        None
    };

    ColumnStats {
        measure,
        count,
        mean: Some(mean),
        std,
        min: Some(values[0]),
        q1: Some(quantile(&values, 0.25)),
        median: Some(quantile(&values, 0.5)),
        q3: Some(quantile(&values, 0.75)),
        max: Some(values[count - 1]),
    }
}

/// Descriptive statistics per measure over the filtered set.
pub fn describe(frame: &FilteredFrame<'_>, measures: &[Measure]) -> Vec<ColumnStats> {
    measures
        .iter()
        .map(|&m| {
            let values: Vec<f64> = frame
                .records()
                .iter()
                .filter_map(|r| m.value(r))
                .collect();
            stats_of(m, values)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outlier fences
// ---------------------------------------------------------------------------

/// 1.5·IQR outlier summary for one measure.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSummary {
    pub measure: Measure,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outliers: usize,
}

/// Count values outside the Tukey fences. Undefined when the measure has no
/// non-null values in the frame.
pub fn outlier_summary(frame: &FilteredFrame<'_>, measure: Measure) -> Option<OutlierSummary> {
    let mut values: Vec<f64> = frame
        .records()
        .iter()
        .filter_map(|r| measure.value(r))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let outliers = values
        .iter()
        .filter(|&&v| v < lower_fence || v > upper_fence)
        .count();

    Some(OutlierSummary {
        measure,
        lower_fence,
        upper_fence,
        outliers,
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

    #[test]
    fn missing_report_counts_and_percentages() {
        let mut a = record("2022-01-15", "Europe", "Smartphone", Some(100.0));
        a.previous_device_os = None;
        let b = record("2022-02-15", "Europe", "Smartphone", None);
        let c = record("2023-03-09", "Europe", "Smartphone", Some(200.0));
        let d = record("2023-04-20", "Europe", "Smartphone", Some(50.0));
        let records = vec![a, b, c, d];

        match missing_report(&frame(&records)) {
            MissingReport::Gaps(gaps) => {
                assert_eq!(gaps.len(), 2);
                let revenue = gaps
                    .iter()
                    .find(|g| g.column == Column::RevenueUsd)
                    .unwrap();
                assert_eq!(revenue.missing, 1);
                assert_eq!(revenue.pct, 25.0);
            }
            MissingReport::Complete => panic!("expected gaps"),
        }
    }

    #[test]
    fn complete_data_yields_the_complete_signal() {
        let records = vec![
            record("2022-01-15", "Europe", "Smartphone", Some(100.0)),
            record("2022-02-15", "Europe", "TV", Some(50.0)),
        ];
        assert_eq!(missing_report(&frame(&records)), MissingReport::Complete);
    }

    #[test]
    fn gaps_are_sorted_by_missing_count_descending() {
        let mut a = record("2022-01-15", "Europe", "Smartphone", None);
        a.customer_rating = None;
        let mut b = record("2022-02-15", "Europe", "Smartphone", Some(1.0));
        b.customer_rating = None;
        let records = vec![a, b];
        match missing_report(&frame(&records)) {
            MissingReport::Gaps(gaps) => {
                assert_eq!(gaps[0].column, Column::CustomerRating);
                assert_eq!(gaps[0].missing, 2);
                assert_eq!(gaps[1].column, Column::RevenueUsd);
            }
            MissingReport::Complete => panic!("expected gaps"),
        }
    }

    #[test]
    fn describe_matches_known_values() {
        let records = vec![
            record("2022-01-15", "Europe", "Smartphone", Some(10.0)),
            record("2022-02-15", "Europe", "Smartphone", Some(20.0)),
            record("2022-03-15", "Europe", "Smartphone", Some(30.0)),
            record("2022-04-15", "Europe", "Smartphone", Some(40.0)),
            record("2022-05-15", "Europe", "Smartphone", None),
        ];
        let stats = &describe(&frame(&records), &[Measure::Revenue])[0];
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(25.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.q1, Some(17.5));
        assert_eq!(stats.median, Some(25.0));
        assert_eq!(stats.q3, Some(32.5));
        assert_eq!(stats.max, Some(40.0));
        // Sample std of 10,20,30,40.
        let expected = (500.0f64 / 3.0).sqrt();
        assert!((stats.std.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn describe_over_all_null_column_is_undefined() {
        let records = vec![record("2022-01-15", "Europe", "Smartphone", None)];
        let stats = &describe(&frame(&records), &[Measure::Revenue])[0];
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn outlier_summary_flags_values_beyond_the_fences() {
        let mut records: Vec<Record> = (1..=9)
            .map(|i| record("2022-01-15", "Europe", "Smartphone", Some(i as f64 * 10.0)))
            .collect();
        records.push(record("2022-02-15", "Europe", "Smartphone", Some(10_000.0)));
        let summary = outlier_summary(&frame(&records), Measure::Revenue).unwrap();
        assert_eq!(summary.outliers, 1);
        assert!(summary.upper_fence < 10_000.0);
    }

    #[test]
    fn outlier_summary_is_none_without_values() {
        let records = vec![record("2022-01-15", "Europe", "Smartphone", None)];
        assert_eq!(outlier_summary(&frame(&records), Measure::Revenue), None);
    }
}
