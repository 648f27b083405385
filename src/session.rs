use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::data::export::export_csv;
use crate::data::filter::{self, FilterOutcome, FilterSpec, FilteredFrame};
use crate::data::loader;
use crate::data::model::Dataset;
use crate::data::DataError;
use crate::view::{build_view, empty_view, ViewPage, ViewReport};

// ---------------------------------------------------------------------------
// Session – one analyst's interaction state
// ---------------------------------------------------------------------------

/// Interaction state independent of any rendering layer: the parsed-dataset
/// cache, the active dataset, and the current filter selections.
///
/// The cache is keyed by a content fingerprint and is write-once per key:
/// re-uploading identical content reuses the parsed dataset instead of
/// parsing again. Each filter change rebuilds the `FilterSpec` wholesale;
/// every view computation receives it explicitly.
#[derive(Default)]
pub struct Session {
    cache: HashMap<String, Arc<Dataset>>,
    dataset: Option<Arc<Dataset>>,
    filters: FilterSpec,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Load a dataset from a file, dispatching by extension.
    pub fn load_path(&mut self, path: &Path) -> Result<(), DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes, &ext)
    }

    /// Load CSV content directly (the upload channel).
    pub fn load_csv(&mut self, bytes: &[u8]) -> Result<(), DataError> {
        self.load_bytes(bytes, "csv")
    }

    fn load_bytes(&mut self, bytes: &[u8], ext: &str) -> Result<(), DataError> {
        let key = loader::fingerprint(bytes);
        let dataset = match self.cache.get(&key) {
            Some(ds) => {
                log::debug!("dataset cache hit for {key}");
                Arc::clone(ds)
            }
            None => {
                let ds = match ext {
                    "csv" => loader::load_csv_bytes(bytes)?,
                    "json" => loader::load_json_bytes(bytes)?,
                    other => return Err(DataError::UnsupportedFormat(other.to_string())),
                };
                let ds = Arc::new(ds);
                self.cache.insert(key, Arc::clone(&ds));
                ds
            }
        };
        self.filters = FilterSpec::all_of(&dataset);
        self.dataset = Some(dataset);
        Ok(())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Replace the filter selections for the next interaction.
    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
    }

    /// Apply the current filters. `None` until a dataset is loaded.
    pub fn outcome(&self) -> Option<FilterOutcome<'_>> {
        self.dataset
            .as_deref()
            .map(|ds| filter::apply(ds, &self.filters))
    }

    /// Build one page from the current filtered set. The empty filter state
    /// yields the page's "no data" report.
    pub fn view(&self, page: ViewPage) -> Option<ViewReport> {
        Some(match self.outcome()? {
            FilterOutcome::Rows(frame) => build_view(page, &frame),
            FilterOutcome::Empty => empty_view(page),
        })
    }

    /// Export the current filtered set as CSV; header-only for the empty
    /// state.
    pub fn export_csv(&self) -> Option<Result<String, DataError>> {
        Some(match self.outcome()? {
            FilterOutcome::Rows(frame) => export_csv(&frame),
            FilterOutcome::Empty => export_csv(&FilteredFrame::from_records(Vec::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
sale_date,year,quarter,month_num,region,country,category,product_name,customer_segment,customer_age_group,previous_device_os,sales_channel,payment_method,return_status,is_5g,unit_price_usd,discount_pct,discounted_price_usd,units_sold,revenue_usd,customer_rating
2022-02-10,2022,Q1,2,North America,USA,Smartphone,Galaxy S22,Consumer,25-34,iOS,Online,Credit Card,Not Returned,Yes,800,5,760,1,760,4.5
2023-11-03,2023,Q4,11,Europe,France,TV,Neo QLED,Business,35-44,Android,Retail,UPI,Returned,No,1200,0,1200,1,1200,3.8
";

    #[test]
    fn identical_content_reuses_the_parsed_dataset() {
        let mut session = Session::new();
        session.load_csv(CSV.as_bytes()).unwrap();
        let first = Arc::clone(session.dataset.as_ref().unwrap());
        session.load_csv(CSV.as_bytes()).unwrap();
        let second = session.dataset.as_ref().unwrap();
        assert!(Arc::ptr_eq(&first, second));
    }

    #[test]
    fn loading_initialises_filters_to_everything() {
        let mut session = Session::new();
        session.load_csv(CSV.as_bytes()).unwrap();
        assert_eq!(session.filters().years.len(), 2);
        assert_eq!(session.filters().regions.len(), 2);
        match session.outcome().unwrap() {
            FilterOutcome::Rows(frame) => assert_eq!(frame.len(), 2),
            FilterOutcome::Empty => panic!("expected rows"),
        }
    }

    #[test]
    fn narrowing_to_no_matches_yields_no_data_views_and_header_only_export() {
        let mut session = Session::new();
        session.load_csv(CSV.as_bytes()).unwrap();
        let mut filters = session.filters().clone();
        filters.years = ["2099".to_string()].into_iter().collect();
        session.set_filters(filters);

        for page in ViewPage::ALL {
            assert!(session.view(page).unwrap().no_data);
        }
        let export = session.export_csv().unwrap().unwrap();
        assert_eq!(export.lines().count(), 1);
    }

    #[test]
    fn no_views_before_a_dataset_is_loaded() {
        let session = Session::new();
        assert!(session.view(ViewPage::Overview).is_none());
        assert!(session.export_csv().is_none());
    }
}
