use std::borrow::Cow;
use std::collections::BTreeSet;

use super::model::{Dataset, Dimension, Measure, Record};

// ---------------------------------------------------------------------------
// FilterSpec – allow-lists for the three filterable dimensions
// ---------------------------------------------------------------------------

/// Per-interaction filter selections: one allow-list per dimension.
///
/// A record passes when its year, region, and category each belong to the
/// corresponding set (AND across dimensions, OR within one). An empty set
/// matches nothing; "everything" must be selected explicitly via
/// [`FilterSpec::all_of`]. Rebuilt on every selection change, never mutated
/// mid-computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub years: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterSpec {
    /// Select every value present in the dataset (the initial state of a
    /// fresh interaction).
    pub fn all_of(dataset: &Dataset) -> Self {
        FilterSpec {
            years: dataset.years().clone(),
            regions: dataset.regions().clone(),
            categories: dataset.categories().clone(),
        }
    }

    /// AND-of-ORs membership test.
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(&record.year)
            && self.regions.contains(&record.region)
            && self.categories.contains(&record.category)
    }
}

// ---------------------------------------------------------------------------
// FilteredFrame – the matched subsequence, in source order
// ---------------------------------------------------------------------------

/// Records that passed the current filters. Every analysis function is a
/// pure function of a frame and also tolerates a zero-row frame.
#[derive(Debug, Clone)]
pub struct FilteredFrame<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredFrame<'a> {
    pub fn from_records(records: Vec<&'a Record>) -> Self {
        FilteredFrame { records }
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct values of a dimension over the frame. Pivot axes are
    /// built from this, so a combination with zero matching records still
    /// gets a row or column.
    pub fn distinct(&self, dim: Dimension) -> Vec<String> {
        let set: BTreeSet<Cow<'_, str>> = self
            .records
            .iter()
            .filter_map(|r| dim.value(r))
            .collect();
        set.into_iter().map(Cow::into_owned).collect()
    }

    /// Sum of a measure's non-null values over the frame.
    pub fn total(&self, measure: Measure) -> f64 {
        self.records
            .iter()
            .filter_map(|r| measure.value(r))
            .sum()
    }

    /// Mean of a measure's non-null values, undefined when all are null.
    pub fn mean(&self, measure: Measure) -> Option<f64> {
        let values: Vec<f64> = self
            .records
            .iter()
            .filter_map(|r| measure.value(r))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Share of records satisfying a predicate, undefined on an empty frame.
    pub fn share(&self, predicate: impl Fn(&Record) -> bool) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let hits = self.records.iter().filter(|r| predicate(r)).count();
        Some(hits as f64 / self.records.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Result of applying a [`FilterSpec`]: either the matched rows or the
/// explicit empty state. Empty is a valid terminal state, not an error; each
/// view simply reports "no data" and the user broadens the filters.
#[derive(Debug)]
pub enum FilterOutcome<'a> {
    Rows(FilteredFrame<'a>),
    Empty,
}

impl<'a> FilterOutcome<'a> {
    pub fn frame(&self) -> Option<&FilteredFrame<'a>> {
        match self {
            FilterOutcome::Rows(frame) => Some(frame),
            FilterOutcome::Empty => None,
        }
    }
}

/// Intersect the filter allow-lists against the dataset.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilterOutcome<'a> {
    let records: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| spec.matches(r))
        .collect();
    if records.is_empty() {
        log::debug!("filter intersection is empty");
        FilterOutcome::Empty
    } else {
        FilterOutcome::Rows(FilteredFrame::from_records(records))
    }
}
