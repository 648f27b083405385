//! View layer: each navigation page is a pure function from the filtered
//! frame to a set of plain tables, registered in a dispatch table keyed by
//! [`ViewPage`]. Any rendering layer (the bundled CLI, a web front-end) can
//! consume the output; nothing here draws anything.
//!
//! Undefined cells render as `n/a` and a view that cannot be computed is
//! simply omitted from the page, so one broken view never prevents the
//! others from rendering.

use serde::Serialize;

use crate::analysis::aggregate::{group_by, Aggregate, GroupedMetric};
use crate::analysis::correlate::correlation;
use crate::analysis::pivot::pivot;
use crate::analysis::quality::{describe, missing_report, outlier_summary, MissingReport};
use crate::analysis::rank::{rank, SortDirection};
use crate::data::filter::FilteredFrame;
use crate::data::model::{Dimension, Measure};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A plain key/value table ready for any renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One navigation section of the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPage {
    Overview,
    Products,
    Regions,
    Customers,
    Channels,
    Quality,
}

impl ViewPage {
    pub const ALL: [ViewPage; 6] = [
        ViewPage::Overview,
        ViewPage::Products,
        ViewPage::Regions,
        ViewPage::Customers,
        ViewPage::Channels,
        ViewPage::Quality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewPage::Overview => "overview",
            ViewPage::Products => "products",
            ViewPage::Regions => "regions",
            ViewPage::Customers => "customers",
            ViewPage::Channels => "channels",
            ViewPage::Quality => "quality",
        }
    }

    pub fn from_name(name: &str) -> Option<ViewPage> {
        ViewPage::ALL
            .into_iter()
            .find(|p| p.label() == name.to_ascii_lowercase())
    }

    /// The page's construction function. One entry per page instead of a
    /// monolithic branch chain in the caller.
    fn builder(self) -> fn(&FilteredFrame<'_>) -> Vec<Table> {
        match self {
            ViewPage::Overview => overview,
            ViewPage::Products => products,
            ViewPage::Regions => regions,
            ViewPage::Customers => customers,
            ViewPage::Channels => channels,
            ViewPage::Quality => quality,
        }
    }
}

/// All tables of one page, or the explicit "no data" marker for the empty
/// filter state.
#[derive(Debug, Clone, Serialize)]
pub struct ViewReport {
    pub page: ViewPage,
    pub no_data: bool,
    pub tables: Vec<Table>,
}

/// Build a page from the filtered frame.
pub fn build_view(page: ViewPage, frame: &FilteredFrame<'_>) -> ViewReport {
    ViewReport {
        page,
        no_data: false,
        tables: (page.builder())(frame),
    }
}

/// The report every page produces for the empty filter state.
pub fn empty_view(page: ViewPage) -> ViewReport {
    ViewReport {
        page,
        no_data: true,
        tables: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Numeric columns shown in descriptive-statistics tables.
const STAT_MEASURES: [Measure; 5] = [
    Measure::UnitPrice,
    Measure::DiscountPct,
    Measure::UnitsSold,
    Measure::Revenue,
    Measure::Rating,
];

/// Numeric columns fed to the correlation matrix.
const CORR_MEASURES: [Measure; 6] = [
    Measure::UnitPrice,
    Measure::DiscountPct,
    Measure::UnitsSold,
    Measure::DiscountedPrice,
    Measure::Revenue,
    Measure::Rating,
];

fn overview(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = vec![kpi_table(frame)];

    let by_year = group_by(frame, Dimension::Year, None, Aggregate::Sum(Measure::Revenue));
    tables.push(keyed_table("Revenue by year", &by_year));

    let by_quarter = group_by(
        frame,
        Dimension::Quarter,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(keyed_table("Revenue by quarter", &by_quarter));

    let monthly = group_by(
        frame,
        Dimension::Year,
        Some(Dimension::Month),
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(period_table("Monthly revenue trend", &monthly));

    let year_quarter = group_by(
        frame,
        Dimension::Year,
        Some(Dimension::Quarter),
        Aggregate::Sum(Measure::Revenue),
    );
    if let Ok(matrix) = pivot(frame, &year_quarter) {
        tables.push(pivot_table("Revenue by year and quarter", &matrix));
    }

    tables.push(describe_table(frame));
    tables
}

fn products(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = Vec::new();

    let by_category = group_by(
        frame,
        Dimension::Category,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Revenue by category",
        &by_category,
        SortDirection::Ascending,
        None,
    ));

    let counts = group_by(frame, Dimension::Category, None, Aggregate::Count);
    tables.push(ranked_table(
        "Transactions by category",
        &counts,
        SortDirection::Descending,
        None,
    ));

    let top_products = group_by(
        frame,
        Dimension::Product,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Top 15 products by revenue",
        &top_products,
        SortDirection::Descending,
        Some(15),
    ));

    let five_g = group_by(frame, Dimension::FiveG, None, Aggregate::Sum(Measure::Revenue));
    tables.push(keyed_table("Revenue by 5G capability", &five_g));

    let rating = group_by(
        frame,
        Dimension::Category,
        None,
        Aggregate::Mean(Measure::Rating),
    );
    tables.push(ranked_table(
        "Average rating by category",
        &rating,
        SortDirection::Ascending,
        None,
    ));

    tables.push(distribution_table(
        "Discount % by category",
        frame,
        Measure::DiscountPct,
    ));
    tables
}

fn regions(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = Vec::new();

    let by_region = group_by(
        frame,
        Dimension::Region,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Revenue by region",
        &by_region,
        SortDirection::Ascending,
        None,
    ));
    tables.push(share_table("Region revenue share", &by_region));

    let countries = group_by(
        frame,
        Dimension::Country,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Top 20 countries by revenue",
        &countries,
        SortDirection::Descending,
        Some(20),
    ));

    let region_category = group_by(
        frame,
        Dimension::Region,
        Some(Dimension::Category),
        Aggregate::Sum(Measure::Revenue),
    );
    if let Ok(matrix) = pivot(frame, &region_category) {
        tables.push(pivot_table("Revenue by region and category", &matrix));
    }

    let trend = group_by(
        frame,
        Dimension::Region,
        Some(Dimension::Year),
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(two_dim_table("Regional revenue trend by year", &trend));
    tables
}

fn customers(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = Vec::new();

    let segments = group_by(frame, Dimension::CustomerSegment, None, Aggregate::Count);
    tables.push(ranked_table(
        "Customer segments",
        &segments,
        SortDirection::Descending,
        None,
    ));

    let ages = group_by(frame, Dimension::AgeGroup, None, Aggregate::Count);
    tables.push(ranked_table(
        "Age group distribution",
        &ages,
        SortDirection::Descending,
        None,
    ));

    let segment_year = group_by(
        frame,
        Dimension::CustomerSegment,
        Some(Dimension::Year),
        Aggregate::Sum(Measure::Revenue),
    );
    if let Ok(matrix) = pivot(frame, &segment_year) {
        tables.push(pivot_table("Revenue by segment and year", &matrix));
    }

    let returns = group_by(frame, Dimension::ReturnStatus, None, Aggregate::Count);
    tables.push(ranked_table(
        "Return status breakdown",
        &returns,
        SortDirection::Descending,
        None,
    ));

    let previous_os = group_by(frame, Dimension::PreviousOs, None, Aggregate::Count);
    tables.push(ranked_table(
        "Previous device OS",
        &previous_os,
        SortDirection::Descending,
        None,
    ));

    let rating = group_by(
        frame,
        Dimension::AgeGroup,
        Some(Dimension::Category),
        Aggregate::Mean(Measure::Rating),
    );
    if let Ok(matrix) = pivot(frame, &rating) {
        tables.push(pivot_table(
            "Average rating by age group and category",
            &matrix,
        ));
    }
    tables
}

fn channels(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = Vec::new();

    let by_channel = group_by(
        frame,
        Dimension::SalesChannel,
        None,
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Revenue by sales channel",
        &by_channel,
        SortDirection::Ascending,
        None,
    ));

    let payments = group_by(frame, Dimension::PaymentMethod, None, Aggregate::Count);
    tables.push(ranked_table(
        "Payment method distribution",
        &payments,
        SortDirection::Descending,
        None,
    ));

    let channel_category = group_by(
        frame,
        Dimension::SalesChannel,
        Some(Dimension::Category),
        Aggregate::Sum(Measure::Revenue),
    );
    if let Ok(matrix) = pivot(frame, &channel_category) {
        tables.push(pivot_table("Revenue by channel and category", &matrix));
    }

    let trend = group_by(
        frame,
        Dimension::SalesChannel,
        Some(Dimension::Year),
        Aggregate::Sum(Measure::Revenue),
    );
    tables.push(two_dim_table("Channel revenue trend by year", &trend));

    let order_value = group_by(
        frame,
        Dimension::SalesChannel,
        None,
        Aggregate::Mean(Measure::Revenue),
    );
    tables.push(ranked_table(
        "Average order value by channel",
        &order_value,
        SortDirection::Ascending,
        None,
    ));

    let payment_segment = group_by(
        frame,
        Dimension::PaymentMethod,
        Some(Dimension::CustomerSegment),
        Aggregate::Sum(Measure::Revenue),
    );
    if let Ok(matrix) = pivot(frame, &payment_segment) {
        tables.push(pivot_table("Revenue by payment method and segment", &matrix));
    }
    tables
}

fn quality(frame: &FilteredFrame<'_>) -> Vec<Table> {
    let mut tables = Vec::new();

    tables.push(match missing_report(frame) {
        MissingReport::Complete => Table {
            title: "Missing values".to_string(),
            headers: vec!["status".to_string()],
            rows: vec![vec![
                "complete: no missing values in the current selection".to_string(),
            ]],
        },
        MissingReport::Gaps(gaps) => Table {
            title: "Missing values".to_string(),
            headers: vec![
                "column".to_string(),
                "missing".to_string(),
                "missing %".to_string(),
            ],
            rows: gaps
                .iter()
                .map(|g| {
                    vec![
                        g.column.name().to_string(),
                        g.missing.to_string(),
                        format!("{:.2}", g.pct),
                    ]
                })
                .collect(),
        },
    });

    if let Ok(matrix) = correlation(frame, &CORR_MEASURES) {
        let mut headers = vec!["measure".to_string()];
        headers.extend(matrix.measures().iter().map(|m| m.name().to_string()));
        let rows = matrix
            .measures()
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut row = vec![m.name().to_string()];
                for j in 0..matrix.measures().len() {
                    row.push(match matrix.get(i, j) {
                        Some(v) => format!("{v:.2}"),
                        None => "n/a".to_string(),
                    });
                }
                row
            })
            .collect();
        tables.push(Table {
            title: format!("Correlation matrix ({} rows retained)", matrix.retained),
            headers,
            rows,
        });
    }

    tables.push(describe_table(frame));

    let mut outlier_rows = Vec::new();
    if let Some(summary) = outlier_summary(frame, Measure::Revenue) {
        outlier_rows.push(vec![
            "(all)".to_string(),
            fmt_num(summary.lower_fence),
            fmt_num(summary.upper_fence),
            summary.outliers.to_string(),
        ]);
    }
    for category in frame.distinct(Dimension::Category) {
        let subset = FilteredFrame::from_records(
            frame
                .records()
                .iter()
                .copied()
                .filter(|r| r.category == category)
                .collect(),
        );
        if let Some(summary) = outlier_summary(&subset, Measure::Revenue) {
            outlier_rows.push(vec![
                category,
                fmt_num(summary.lower_fence),
                fmt_num(summary.upper_fence),
                summary.outliers.to_string(),
            ]);
        }
    }
    tables.push(Table {
        title: "Revenue outliers (1.5 IQR fences)".to_string(),
        headers: vec![
            "category".to_string(),
            "lower fence".to_string(),
            "upper fence".to_string(),
            "outliers".to_string(),
        ],
        rows: outlier_rows,
    });
    tables
}

// ---------------------------------------------------------------------------
// Table construction helpers
// ---------------------------------------------------------------------------

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => fmt_num(v),
        None => "n/a".to_string(),
    }
}

fn kpi_table(frame: &FilteredFrame<'_>) -> Table {
    let rows = vec![
        vec![
            "Total revenue".to_string(),
            fmt_num(frame.total(Measure::Revenue)),
        ],
        vec!["Transactions".to_string(), frame.len().to_string()],
        vec![
            "Avg order value".to_string(),
            fmt_opt(frame.mean(Measure::Revenue)),
        ],
        vec![
            "Return rate %".to_string(),
            fmt_opt(frame.share(|r| r.return_status == "Returned").map(|s| s * 100.0)),
        ],
        vec![
            "Avg rating".to_string(),
            fmt_opt(frame.mean(Measure::Rating)),
        ],
        vec![
            "Avg discount %".to_string(),
            fmt_opt(frame.mean(Measure::DiscountPct)),
        ],
    ];
    Table {
        title: "Key metrics".to_string(),
        headers: vec!["metric".to_string(), "value".to_string()],
        rows,
    }
}

/// One-dimension metric in key order.
fn keyed_table(title: &str, metric: &GroupedMetric) -> Table {
    Table {
        title: title.to_string(),
        headers: vec![
            metric.primary_dim.label().to_string(),
            metric.aggregate.label(),
        ],
        rows: metric
            .sorted_by_key()
            .into_iter()
            .map(|(k, v)| vec![k.primary, fmt_opt(v)])
            .collect(),
    }
}

/// One-dimension metric in ranked order.
fn ranked_table(
    title: &str,
    metric: &GroupedMetric,
    direction: SortDirection,
    top_n: Option<usize>,
) -> Table {
    Table {
        title: title.to_string(),
        headers: vec![
            metric.primary_dim.label().to_string(),
            metric.aggregate.label(),
        ],
        rows: rank(metric, direction, top_n)
            .into_iter()
            .map(|(k, v)| vec![k.primary, fmt_opt(v)])
            .collect(),
    }
}

/// Two-dimension metric with one row per key pair, in key order.
fn two_dim_table(title: &str, metric: &GroupedMetric) -> Table {
    let secondary = metric
        .secondary_dim
        .map(|d| d.label())
        .unwrap_or("value");
    Table {
        title: title.to_string(),
        headers: vec![
            metric.primary_dim.label().to_string(),
            secondary.to_string(),
            metric.aggregate.label(),
        ],
        rows: metric
            .sorted_by_key()
            .into_iter()
            .map(|(k, v)| vec![k.primary, k.secondary.unwrap_or_default(), fmt_opt(v)])
            .collect(),
    }
}

/// Two-dimension metric with the key pair joined into one period label
/// (`2023-04`), for calendar trends.
fn period_table(title: &str, metric: &GroupedMetric) -> Table {
    Table {
        title: title.to_string(),
        headers: vec!["period".to_string(), metric.aggregate.label()],
        rows: metric
            .sorted_by_key()
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), fmt_opt(v)])
            .collect(),
    }
}

fn pivot_table(title: &str, matrix: &crate::analysis::pivot::PivotMatrix) -> Table {
    let mut headers = vec![matrix.row_dim.label().to_string()];
    headers.extend(matrix.cols().iter().cloned());
    let rows = matrix
        .rows()
        .iter()
        .enumerate()
        .map(|(ri, label)| {
            let mut row = vec![label.clone()];
            for ci in 0..matrix.cols().len() {
                row.push(fmt_opt(matrix.get(ri, ci)));
            }
            row
        })
        .collect();
    Table {
        title: title.to_string(),
        headers,
        rows,
    }
}

/// Percentage share of an additive metric's total per key.
fn share_table(title: &str, metric: &GroupedMetric) -> Table {
    let total = metric.total();
    Table {
        title: title.to_string(),
        headers: vec![
            metric.primary_dim.label().to_string(),
            "share %".to_string(),
        ],
        rows: rank(metric, SortDirection::Descending, None)
            .into_iter()
            .map(|(k, v)| {
                let share = match v {
                    Some(v) if total > 0.0 => Some(v / total * 100.0),
                    _ => None,
                };
                vec![k.primary, fmt_opt(share)]
            })
            .collect(),
    }
}

fn describe_table(frame: &FilteredFrame<'_>) -> Table {
    let rows = describe(frame, &STAT_MEASURES)
        .into_iter()
        .map(|s| {
            vec![
                s.measure.name().to_string(),
                s.count.to_string(),
                fmt_opt(s.mean),
                fmt_opt(s.std),
                fmt_opt(s.min),
                fmt_opt(s.q1),
                fmt_opt(s.median),
                fmt_opt(s.q3),
                fmt_opt(s.max),
            ]
        })
        .collect();
    Table {
        title: "Descriptive statistics".to_string(),
        headers: ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows,
    }
}

/// Quartile spread of one measure per category.
fn distribution_table(title: &str, frame: &FilteredFrame<'_>, measure: Measure) -> Table {
    let rows = frame
        .distinct(Dimension::Category)
        .into_iter()
        .map(|category| {
            let subset = FilteredFrame::from_records(
                frame
                    .records()
                    .iter()
                    .copied()
                    .filter(|r| r.category == category)
                    .collect(),
            );
            let stats = describe(&subset, &[measure]).remove(0);
            vec![
                category,
                stats.count.to_string(),
                fmt_opt(stats.min),
                fmt_opt(stats.q1),
                fmt_opt(stats.median),
                fmt_opt(stats.q3),
                fmt_opt(stats.max),
            ]
        })
        .collect();
    Table {
        title: title.to_string(),
        headers: ["category", "count", "min", "25%", "50%", "75%", "max"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows,
    }
}
