use super::aggregate::{GroupKey, GroupedMetric};

/// Sort direction for ranked views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Order a grouped metric by aggregate value and optionally truncate to the
/// top N entries.
///
/// The sort is stable, so ties keep the first-appearance order of the
/// underlying records and the output is reproducible across runs. Undefined
/// values sort after every defined value in both directions. If fewer than N
/// groups exist, all of them are returned.
pub fn rank(
    metric: &GroupedMetric,
    direction: SortDirection,
    top_n: Option<usize>,
) -> Vec<(GroupKey, Option<f64>)> {
    let mut entries: Vec<(GroupKey, Option<f64>)> = metric.entries().to_vec();

    entries.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.total_cmp(b),
            SortDirection::Descending => b.total_cmp(a),
        },
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    if let Some(n) = top_n {
        entries.truncate(n);
    }
    entries
}
