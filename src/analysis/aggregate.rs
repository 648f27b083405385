use std::collections::HashMap;
use std::fmt;

use crate::data::filter::FilteredFrame;
use crate::data::model::{Dimension, Measure};

// ---------------------------------------------------------------------------
// Aggregate kinds
// ---------------------------------------------------------------------------

/// The aggregate computed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum(Measure),
    Mean(Measure),
    /// Number of records in the group; no measure involved.
    Count,
}

impl Aggregate {
    /// Additive aggregates fill absent pivot cells with zero ("no
    /// transactions" genuinely is zero revenue); non-additive ones leave the
    /// cell undefined (zero would misread "no data" as "zero rating").
    pub fn is_additive(self) -> bool {
        matches!(self, Aggregate::Sum(_) | Aggregate::Count)
    }

    /// Display label used as a table header.
    pub fn label(self) -> String {
        match self {
            Aggregate::Sum(m) => format!("sum({m})"),
            Aggregate::Mean(m) => format!("mean({m})"),
            Aggregate::Count => "count".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// GroupKey and GroupedMetric
// ---------------------------------------------------------------------------

/// Key of one group: value of the primary dimension, plus the secondary
/// dimension's value for two-dimension groupings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub primary: String,
    pub secondary: Option<String>,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(s) => write!(f, "{}-{}", self.primary, s),
            None => f.write_str(&self.primary),
        }
    }
}

/// A grouped aggregate: unique keys mapped to an aggregate value, in
/// first-appearance order of the underlying records.
///
/// Values are `Option<f64>`: a mean over a group whose measure is null for
/// every record is undefined and stays `None`.
#[derive(Debug, Clone)]
pub struct GroupedMetric {
    pub primary_dim: Dimension,
    pub secondary_dim: Option<Dimension>,
    pub aggregate: Aggregate,
    entries: Vec<(GroupKey, Option<f64>)>,
}

impl GroupedMetric {
    pub fn entries(&self) -> &[(GroupKey, Option<f64>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<Option<f64>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Entries reordered by key (lexicographic), for trend views where the
    /// key is a calendar dimension.
    pub fn sorted_by_key(&self) -> Vec<(GroupKey, Option<f64>)> {
        let mut out = self.entries.clone();
        out.sort_by(|(a, _), (b, _)| {
            a.primary
                .cmp(&b.primary)
                .then_with(|| a.secondary.cmp(&b.secondary))
        });
        out
    }

    /// Sum of all defined values. For an additive aggregate over a single
    /// dimension this equals the same aggregate over the whole frame
    /// (partition completeness).
    pub fn total(&self) -> f64 {
        self.entries.iter().filter_map(|(_, v)| *v).sum()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

struct GroupAcc {
    key: GroupKey,
    sum: f64,
    non_null: usize,
    rows: usize,
}

/// Group the frame by one or two dimensions and compute an aggregate per
/// group. Key equality is exact (case-sensitive) value equality. Records
/// whose grouping dimension is null are skipped, matching how the source
/// data treats customers without a previous device.
pub fn group_by(
    frame: &FilteredFrame<'_>,
    primary: Dimension,
    secondary: Option<Dimension>,
    aggregate: Aggregate,
) -> GroupedMetric {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<GroupAcc> = Vec::new();

    for record in frame.records() {
        let Some(primary_value) = primary.value(record) else {
            continue;
        };
        let secondary_value = match secondary {
            Some(dim) => match dim.value(record) {
                Some(v) => Some(v.into_owned()),
                None => continue,
            },
            None => None,
        };
        let key = GroupKey {
            primary: primary_value.into_owned(),
            secondary: secondary_value,
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupAcc {
                key,
                sum: 0.0,
                non_null: 0,
                rows: 0,
            });
            groups.len() - 1
        });
        let acc = &mut groups[slot];
        acc.rows += 1;

        let measure = match aggregate {
            Aggregate::Sum(m) | Aggregate::Mean(m) => Some(m),
            Aggregate::Count => None,
        };
        if let Some(m) = measure {
            if let Some(v) = m.value(record) {
                acc.sum += v;
                acc.non_null += 1;
            }
        }
    }

    let entries = groups
        .into_iter()
        .map(|acc| {
            let value = match aggregate {
                Aggregate::Sum(_) => Some(acc.sum),
                Aggregate::Count => Some(acc.rows as f64),
                Aggregate::Mean(_) => {
                    if acc.non_null == 0 {
                        None
                    } else {
                        Some(acc.sum / acc.non_null as f64)
                    }
                }
            };
            (acc.key, value)
        })
        .collect();

    GroupedMetric {
        primary_dim: primary,
        secondary_dim: secondary,
        aggregate,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::testkit::record;

    fn frame(records: &[Record]) -> FilteredFrame<'_> {
        FilteredFrame::from_records(records.iter().collect())
    }

    fn sample() -> Vec<Record> {
        vec![
            record("2022-01-15", "North America", "Smartphone", Some(100.0)),
            record("2022-06-02", "North America", "TV", Some(50.0)),
            record("2023-03-09", "Europe", "Smartphone", Some(200.0)),
            record("2023-04-20", "Europe", "Smartphone", None),
        ]
    }

    #[test]
    fn sum_by_year_partitions_the_frame_total() {
        let records = sample();
        let f = frame(&records);
        let metric = group_by(&f, Dimension::Year, None, Aggregate::Sum(Measure::Revenue));
        assert_eq!(metric.total(), f.total(Measure::Revenue));
        assert_eq!(
            metric.get(&GroupKey {
                primary: "2022".into(),
                secondary: None
            }),
            Some(Some(150.0))
        );
        assert_eq!(
            metric.get(&GroupKey {
                primary: "2023".into(),
                secondary: None
            }),
            Some(Some(200.0))
        );
    }

    #[test]
    fn entries_keep_first_appearance_order() {
        let records = vec![
            record("2022-01-15", "Europe", "TV", Some(1.0)),
            record("2022-02-15", "Europe", "Smartphone", Some(2.0)),
            record("2022-03-15", "Europe", "TV", Some(3.0)),
            record("2022-04-15", "Europe", "Audio", Some(4.0)),
        ];
        let metric = group_by(
            &frame(&records),
            Dimension::Category,
            None,
            Aggregate::Sum(Measure::Revenue),
        );
        let keys: Vec<&str> = metric
            .entries()
            .iter()
            .map(|(k, _)| k.primary.as_str())
            .collect();
        assert_eq!(keys, ["TV", "Smartphone", "Audio"]);
    }

    #[test]
    fn mean_excludes_nulls_from_the_divisor() {
        let records = vec![
            record("2023-03-09", "Europe", "Smartphone", Some(200.0)),
            record("2023-04-20", "Europe", "Smartphone", None),
        ];
        let metric = group_by(
            &frame(&records),
            Dimension::Year,
            None,
            Aggregate::Mean(Measure::Revenue),
        );
        // One null row, one 200.0 row: mean divides by 1, not 2.
        assert_eq!(metric.entries()[0].1, Some(200.0));
    }

    #[test]
    fn mean_over_all_null_group_is_undefined() {
        let mut a = record("2022-01-15", "Europe", "Smartphone", Some(1.0));
        let mut b = record("2022-02-15", "Europe", "Smartphone", Some(2.0));
        a.customer_rating = None;
        b.customer_rating = None;
        let records = vec![a, b];
        let metric = group_by(
            &frame(&records),
            Dimension::Category,
            None,
            Aggregate::Mean(Measure::Rating),
        );
        assert_eq!(metric.entries()[0].1, None);
    }

    #[test]
    fn count_includes_null_measure_rows() {
        let records = sample();
        let metric = group_by(&frame(&records), Dimension::Year, None, Aggregate::Count);
        assert_eq!(
            metric.get(&GroupKey {
                primary: "2023".into(),
                secondary: None
            }),
            Some(Some(2.0))
        );
    }

    #[test]
    fn two_dimension_grouping_builds_composite_keys() {
        let records = sample();
        let metric = group_by(
            &frame(&records),
            Dimension::Year,
            Some(Dimension::Category),
            Aggregate::Sum(Measure::Revenue),
        );
        assert_eq!(
            metric.get(&GroupKey {
                primary: "2022".into(),
                secondary: Some("TV".into())
            }),
            Some(Some(50.0))
        );
        assert_eq!(metric.len(), 3);
    }

    #[test]
    fn grouping_on_a_null_dimension_skips_the_record() {
        let mut a = record("2022-01-15", "Europe", "Smartphone", Some(1.0));
        a.previous_device_os = None;
        let b = record("2022-02-15", "Europe", "Smartphone", Some(2.0));
        let records = vec![a, b];
        let metric = group_by(&frame(&records), Dimension::PreviousOs, None, Aggregate::Count);
        assert_eq!(metric.len(), 1);
        assert_eq!(metric.entries()[0].0.primary, "Android");
    }

    #[test]
    fn empty_frame_produces_an_empty_metric() {
        let records: Vec<Record> = Vec::new();
        let metric = group_by(
            &frame(&records),
            Dimension::Year,
            None,
            Aggregate::Sum(Measure::Revenue),
        );
        assert!(metric.is_empty());
        assert_eq!(metric.total(), 0.0);
    }
}
