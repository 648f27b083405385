use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::schema::Column;

// ---------------------------------------------------------------------------
// Record – one sales transaction
// ---------------------------------------------------------------------------

/// A single transaction (one row of the source table).
///
/// Calendar fields (`year`, `quarter`, `month_num`) are derived by the loader
/// from `sale_date`; records are never constructed with values that disagree
/// with the date. Numeric fields are `Option` because the source may carry
/// blank cells; `revenue_usd` is non-negative whenever present.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub sale_date: NaiveDate,
    /// Calendar year of `sale_date`, kept as text for grouping and display.
    pub year: String,
    /// `Q1`..`Q4`.
    pub quarter: String,
    /// Calendar month of `sale_date`, 1..=12.
    pub month_num: u32,
    pub region: String,
    pub country: String,
    pub category: String,
    pub product_name: String,
    pub customer_segment: String,
    pub customer_age_group: String,
    pub previous_device_os: Option<String>,
    pub sales_channel: String,
    pub payment_method: String,
    pub return_status: String,
    pub is_5g: bool,
    pub unit_price_usd: Option<f64>,
    pub discount_pct: Option<f64>,
    pub discounted_price_usd: Option<f64>,
    pub units_sold: Option<f64>,
    pub revenue_usd: Option<f64>,
    pub customer_rating: Option<f64>,
}

// ---------------------------------------------------------------------------
// Dimension – categorical/temporal fields usable for grouping and filtering
// ---------------------------------------------------------------------------

/// A field records can be grouped or filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Year,
    Quarter,
    /// Calendar month as a zero-padded index (`01`..`12`).
    Month,
    Region,
    Country,
    Category,
    Product,
    CustomerSegment,
    AgeGroup,
    /// Null for customers with no previous device; such records are skipped
    /// when grouping on this dimension.
    PreviousOs,
    SalesChannel,
    PaymentMethod,
    ReturnStatus,
    FiveG,
}

impl Dimension {
    /// The record's value for this dimension, or `None` when the underlying
    /// field is null.
    pub fn value<'a>(self, record: &'a Record) -> Option<Cow<'a, str>> {
        match self {
            Dimension::Year => Some(Cow::Borrowed(record.year.as_str())),
            Dimension::Quarter => Some(Cow::Borrowed(record.quarter.as_str())),
            Dimension::Month => Some(Cow::Owned(format!("{:02}", record.month_num))),
            Dimension::Region => Some(Cow::Borrowed(record.region.as_str())),
            Dimension::Country => Some(Cow::Borrowed(record.country.as_str())),
            Dimension::Category => Some(Cow::Borrowed(record.category.as_str())),
            Dimension::Product => Some(Cow::Borrowed(record.product_name.as_str())),
            Dimension::CustomerSegment => Some(Cow::Borrowed(record.customer_segment.as_str())),
            Dimension::AgeGroup => Some(Cow::Borrowed(record.customer_age_group.as_str())),
            Dimension::PreviousOs => record.previous_device_os.as_deref().map(Cow::Borrowed),
            Dimension::SalesChannel => Some(Cow::Borrowed(record.sales_channel.as_str())),
            Dimension::PaymentMethod => Some(Cow::Borrowed(record.payment_method.as_str())),
            Dimension::ReturnStatus => Some(Cow::Borrowed(record.return_status.as_str())),
            Dimension::FiveG => Some(Cow::Borrowed(if record.is_5g { "5G" } else { "Non-5G" })),
        }
    }

    /// Display label used as a table header.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Quarter => "quarter",
            Dimension::Month => "month",
            Dimension::Region => "region",
            Dimension::Country => "country",
            Dimension::Category => "category",
            Dimension::Product => "product",
            Dimension::CustomerSegment => "segment",
            Dimension::AgeGroup => "age_group",
            Dimension::PreviousOs => "previous_os",
            Dimension::SalesChannel => "channel",
            Dimension::PaymentMethod => "payment_method",
            Dimension::ReturnStatus => "return_status",
            Dimension::FiveG => "5g",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Measure – numeric fields usable for aggregation
// ---------------------------------------------------------------------------

/// A numeric field an aggregate can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    UnitPrice,
    DiscountPct,
    DiscountedPrice,
    UnitsSold,
    Revenue,
    Rating,
}

impl Measure {
    /// All measures, in schema order.
    pub const ALL: [Measure; 6] = [
        Measure::UnitPrice,
        Measure::DiscountPct,
        Measure::DiscountedPrice,
        Measure::UnitsSold,
        Measure::Revenue,
        Measure::Rating,
    ];

    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Measure::UnitPrice => record.unit_price_usd,
            Measure::DiscountPct => record.discount_pct,
            Measure::DiscountedPrice => record.discounted_price_usd,
            Measure::UnitsSold => record.units_sold,
            Measure::Revenue => record.revenue_usd,
            Measure::Rating => record.customer_rating,
        }
    }

    /// The schema column this measure reads from.
    pub fn column(self) -> Column {
        match self {
            Measure::UnitPrice => Column::UnitPriceUsd,
            Measure::DiscountPct => Column::DiscountPct,
            Measure::DiscountedPrice => Column::DiscountedPriceUsd,
            Measure::UnitsSold => Column::UnitsSold,
            Measure::Revenue => Column::RevenueUsd,
            Measure::Rating => Column::CustomerRating,
        }
    }

    pub fn name(self) -> &'static str {
        self.column().name()
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values for the three
/// filterable dimensions. Records are immutable once loaded; only read-only
/// views are exposed.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    years: BTreeSet<String>,
    regions: BTreeSet<String>,
    categories: BTreeSet<String>,
}

impl Dataset {
    /// Build the distinct-value indices from loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut categories = BTreeSet::new();
        for r in &records {
            years.insert(r.year.clone());
            regions.insert(r.region.clone());
            categories.insert(r.category.clone());
        }
        Dataset {
            records,
            years,
            regions,
            categories,
        }
    }

    /// Read-only view of all records, in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct years present in the dataset.
    pub fn years(&self) -> &BTreeSet<String> {
        &self.years
    }

    /// Sorted distinct regions present in the dataset.
    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// Sorted distinct categories present in the dataset.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }
}
