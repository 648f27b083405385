use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use super::model::{Dataset, Record};
use super::schema::{Column, ColumnKind};
use super::DataError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with the schema's column names (recommended)
/// * `.json` – records-oriented array, `[{ "sale_date": "...", ... }, ...]`
pub fn load_path(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let bytes = std::fs::read(path)?;
    match ext.as_str() {
        "csv" => load_csv_bytes(&bytes),
        "json" => load_json_bytes(&bytes),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

/// Content fingerprint of a raw upload, used as the parse-cache key.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV content into a [`Dataset`].
///
/// The whole load is rejected on the first unparseable cell; a partially
/// loaded file would silently bias every downstream aggregate. Calendar
/// fields are always rederived from `sale_date`, the input's `year` and
/// `month_num` columns (if any) are ignored.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<Dataset, DataError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut index: HashMap<Column, usize> = HashMap::new();
    for col in Column::ALL {
        match headers.iter().position(|h| h == col.name()) {
            Some(i) => {
                index.insert(col, i);
            }
            None if col.required() => return Err(DataError::Schema(col)),
            None => {}
        }
    }

    fn cell<'r>(row: &'r csv::StringRecord, index: &HashMap<Column, usize>, col: Column) -> &'r str {
        index.get(&col).and_then(|&i| row.get(i)).unwrap_or("").trim()
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cell = |col: Column| cell(&row, &index, col);

        let sale_date = parse_date(cell(Column::SaleDate), row_no)?;
        let quarter = match cell(Column::Quarter) {
            "" => derive_quarter(sale_date.month()),
            q => q.to_string(),
        };

        records.push(build_record(
            row_no,
            sale_date,
            quarter,
            cell(Column::Region).to_string(),
            cell(Column::Country).to_string(),
            cell(Column::Category).to_string(),
            cell(Column::ProductName).to_string(),
            cell(Column::CustomerSegment).to_string(),
            cell(Column::CustomerAgeGroup).to_string(),
            optional_text(cell(Column::PreviousDeviceOs)),
            cell(Column::SalesChannel).to_string(),
            cell(Column::PaymentMethod).to_string(),
            cell(Column::ReturnStatus).to_string(),
            parse_flag(cell(Column::Is5g), row_no)?,
            parse_number(cell(Column::UnitPriceUsd), row_no, Column::UnitPriceUsd)?,
            parse_number(cell(Column::DiscountPct), row_no, Column::DiscountPct)?,
            parse_number(
                cell(Column::DiscountedPriceUsd),
                row_no,
                Column::DiscountedPriceUsd,
            )?,
            parse_number(cell(Column::UnitsSold), row_no, Column::UnitsSold)?,
            parse_number(cell(Column::RevenueUsd), row_no, Column::RevenueUsd)?,
            parse_number(cell(Column::CustomerRating), row_no, Column::CustomerRating)?,
        )?);
    }

    log::info!("loaded {} records from CSV", records.len());
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Parse a records-oriented JSON array (the default `to_json(orient='records')`
/// layout) into a [`Dataset`]. Same derivation and rejection policy as CSV.
pub fn load_json_bytes(bytes: &[u8]) -> Result<Dataset, DataError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let rows = root.as_array().ok_or_else(|| DataError::JsonShape {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| DataError::JsonShape {
            row: row_no,
            message: "row is not a JSON object".to_string(),
        })?;

        // A required key missing entirely is a schema problem, not a cell
        // problem.
        for col in Column::ALL {
            if col.required() && !col.nullable() && !obj.contains_key(col.name()) {
                return Err(DataError::Schema(col));
            }
        }

        let text = |col: Column| -> Result<String, DataError> {
            match obj.get(col.name()) {
                Some(JsonValue::String(s)) => Ok(s.trim().to_string()),
                Some(other) if !other.is_null() => Ok(other.to_string()),
                _ => Err(DataError::JsonShape {
                    row: row_no,
                    message: format!("missing value for '{col}'"),
                }),
            }
        };
        let number = |col: Column| -> Result<Option<f64>, DataError> {
            match obj.get(col.name()) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(JsonValue::Number(n)) => Ok(n.as_f64()),
                Some(other) => Err(DataError::Parse {
                    row: row_no,
                    column: col,
                    value: other.to_string(),
                }),
            }
        };

        let sale_date = parse_date(&text(Column::SaleDate)?, row_no)?;
        let quarter = match obj.get(Column::Quarter.name()) {
            Some(JsonValue::String(q)) if !q.trim().is_empty() => q.trim().to_string(),
            _ => derive_quarter(sale_date.month()),
        };
        let previous_os = match obj.get(Column::PreviousDeviceOs.name()) {
            Some(JsonValue::String(s)) => optional_text(s.trim()),
            _ => None,
        };
        let is_5g = match obj.get(Column::Is5g.name()) {
            Some(JsonValue::Bool(b)) => *b,
            Some(JsonValue::String(s)) => parse_flag(s.trim(), row_no)?,
            _ => {
                return Err(DataError::JsonShape {
                    row: row_no,
                    message: "missing value for 'is_5g'".to_string(),
                })
            }
        };

        records.push(build_record(
            row_no,
            sale_date,
            quarter,
            text(Column::Region)?,
            text(Column::Country)?,
            text(Column::Category)?,
            text(Column::ProductName)?,
            text(Column::CustomerSegment)?,
            text(Column::CustomerAgeGroup)?,
            previous_os,
            text(Column::SalesChannel)?,
            text(Column::PaymentMethod)?,
            text(Column::ReturnStatus)?,
            is_5g,
            number(Column::UnitPriceUsd)?,
            number(Column::DiscountPct)?,
            number(Column::DiscountedPriceUsd)?,
            number(Column::UnitsSold)?,
            number(Column::RevenueUsd)?,
            number(Column::CustomerRating)?,
        )?);
    }

    log::info!("loaded {} records from JSON", records.len());
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Field parsing and derivation helpers
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn build_record(
    row_no: usize,
    sale_date: NaiveDate,
    quarter: String,
    region: String,
    country: String,
    category: String,
    product_name: String,
    customer_segment: String,
    customer_age_group: String,
    previous_device_os: Option<String>,
    sales_channel: String,
    payment_method: String,
    return_status: String,
    is_5g: bool,
    unit_price_usd: Option<f64>,
    discount_pct: Option<f64>,
    discounted_price_usd: Option<f64>,
    units_sold: Option<f64>,
    revenue_usd: Option<f64>,
    customer_rating: Option<f64>,
) -> Result<Record, DataError> {
    if let Some(rev) = revenue_usd {
        if rev < 0.0 {
            return Err(DataError::NegativeRevenue {
                row: row_no,
                value: rev,
            });
        }
    }
    Ok(Record {
        sale_date,
        year: sale_date.year().to_string(),
        quarter,
        month_num: sale_date.month(),
        region,
        country,
        category,
        product_name,
        customer_segment,
        customer_age_group,
        previous_device_os,
        sales_channel,
        payment_method,
        return_status,
        is_5g,
        unit_price_usd,
        discount_pct,
        discounted_price_usd,
        units_sold,
        revenue_usd,
        customer_rating,
    })
}

fn derive_quarter(month: u32) -> String {
    format!("Q{}", (month - 1) / 3 + 1)
}

fn optional_text(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_date(s: &str, row: usize) -> Result<NaiveDate, DataError> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Ok(d);
        }
    }
    Err(DataError::Parse {
        row,
        column: Column::SaleDate,
        value: s.to_string(),
    })
}

fn parse_number(s: &str, row: usize, column: Column) -> Result<Option<f64>, DataError> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::Parse {
            row,
            column,
            value: s.to_string(),
        })
}

fn parse_flag(s: &str, row: usize) -> Result<bool, DataError> {
    match s.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" => Ok(false),
        _ => Err(DataError::Parse {
            row,
            column: Column::Is5g,
            value: s.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
sale_date,year,quarter,month_num,region,country,category,product_name,customer_segment,customer_age_group,previous_device_os,sales_channel,payment_method,return_status,is_5g,unit_price_usd,discount_pct,discounted_price_usd,units_sold,revenue_usd,customer_rating
2022-02-10,2022,Q1,2,North America,USA,Smartphone,Galaxy S22,Consumer,25-34,iOS,Online,Credit Card,Not Returned,Yes,800,5,760,1,760,4.5
2022-07-21,2022,Q3,7,Europe,Germany,TV,Neo QLED,Consumer,35-44,,Retail,Debit Card,Not Returned,No,1200,0,1200,1,1200,
2023-11-03,2023,Q4,11,Europe,France,Smartphone,Galaxy S23,Business,25-34,Android,Online,UPI,Returned,Yes,900,10,810,2,1620,3.8
";

    #[test]
    fn csv_load_derives_calendar_fields_from_the_date() {
        // The year column in the file deliberately disagrees below; the
        // loader must trust the date, not the column.
        let tampered = SAMPLE_CSV.replace("2022-02-10,2022", "2022-02-10,1999");
        let ds = load_csv_bytes(tampered.as_bytes()).unwrap();
        let first = &ds.records()[0];
        assert_eq!(first.year, "2022");
        assert_eq!(first.month_num, 2);
        assert_eq!(first.quarter, "Q1");
    }

    #[test]
    fn csv_quarter_is_derived_when_column_is_blank() {
        let blanked = SAMPLE_CSV.replace("2022-07-21,2022,Q3", "2022-07-21,2022,");
        let ds = load_csv_bytes(blanked.as_bytes()).unwrap();
        assert_eq!(ds.records()[1].quarter, "Q3");
    }

    #[test]
    fn csv_blank_cells_become_nulls() {
        let ds = load_csv_bytes(SAMPLE_CSV.as_bytes()).unwrap();
        let second = &ds.records()[1];
        assert_eq!(second.previous_device_os, None);
        assert_eq!(second.customer_rating, None);
        assert_eq!(second.revenue_usd, Some(1200.0));
    }

    #[test]
    fn missing_required_column_names_the_column() {
        let broken = SAMPLE_CSV.replace("revenue_usd", "rev");
        let err = load_csv_bytes(broken.as_bytes()).unwrap_err();
        match err {
            DataError::Schema(col) => assert_eq!(col, Column::RevenueUsd),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_number_rejects_the_whole_load() {
        let broken = SAMPLE_CSV.replace("No,1200,0", "No,12oo,0");
        let err = load_csv_bytes(broken.as_bytes()).unwrap_err();
        match err {
            DataError::Parse { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, Column::UnitPriceUsd);
                assert_eq!(value, "12oo");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn negative_revenue_rejects_the_load() {
        let broken = SAMPLE_CSV.replace("2,1620,3.8", "2,-1620,3.8");
        let err = load_csv_bytes(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NegativeRevenue { row: 2, .. }));
    }

    #[test]
    fn json_records_load_matches_csv_semantics() {
        let json = r#"[
            {"sale_date": "2022-02-10", "region": "North America", "country": "USA",
             "category": "Smartphone", "product_name": "Galaxy S22",
             "customer_segment": "Consumer", "customer_age_group": "25-34",
             "previous_device_os": "iOS", "sales_channel": "Online",
             "payment_method": "Credit Card", "return_status": "Not Returned",
             "is_5g": true, "unit_price_usd": 800.0, "discount_pct": 5.0,
             "discounted_price_usd": 760.0, "units_sold": 1,
             "revenue_usd": 760.0, "customer_rating": null}
        ]"#;
        let ds = load_json_bytes(json.as_bytes()).unwrap();
        let r = &ds.records()[0];
        assert_eq!(r.year, "2022");
        assert_eq!(r.quarter, "Q1");
        assert!(r.is_5g);
        assert_eq!(r.customer_rating, None);
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = fingerprint(b"abc");
        assert_eq!(a, fingerprint(b"abc"));
        assert_ne!(a, fingerprint(b"abd"));
        assert_eq!(a.len(), 64);
    }
}
