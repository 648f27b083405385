use super::filter::FilteredFrame;
use super::model::Record;
use super::schema::Column;
use super::DataError;

// ---------------------------------------------------------------------------
// CSV export of the current filtered set
// ---------------------------------------------------------------------------

/// Serialize the filtered records back to CSV in the original column order.
///
/// Null cells are written empty. An empty frame produces a header-only file,
/// which is the correct export for the empty filter state.
pub fn export_csv(frame: &FilteredFrame<'_>) -> Result<String, DataError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(Column::ALL.iter().map(|c| c.name()))?;
    for record in frame.records() {
        writer.write_record(Column::ALL.iter().map(|&c| cell_text(record, c)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| std::io::Error::other(e.to_string()).into())
}

fn cell_text(record: &Record, column: Column) -> String {
    fn num(v: Option<f64>) -> String {
        match v {
            Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
            Some(v) => v.to_string(),
            None => String::new(),
        }
    }

    match column {
        Column::SaleDate => record.sale_date.format("%Y-%m-%d").to_string(),
        Column::Year => record.year.clone(),
        Column::Quarter => record.quarter.clone(),
        Column::MonthNum => record.month_num.to_string(),
        Column::Region => record.region.clone(),
        Column::Country => record.country.clone(),
        Column::Category => record.category.clone(),
        Column::ProductName => record.product_name.clone(),
        Column::CustomerSegment => record.customer_segment.clone(),
        Column::CustomerAgeGroup => record.customer_age_group.clone(),
        Column::PreviousDeviceOs => record.previous_device_os.clone().unwrap_or_default(),
        Column::SalesChannel => record.sales_channel.clone(),
        Column::PaymentMethod => record.payment_method.clone(),
        Column::ReturnStatus => record.return_status.clone(),
        Column::Is5g => if record.is_5g { "Yes" } else { "No" }.to_string(),
        Column::UnitPriceUsd => num(record.unit_price_usd),
        Column::DiscountPct => num(record.discount_pct),
        Column::DiscountedPriceUsd => num(record.discounted_price_usd),
        Column::UnitsSold => num(record.units_sold),
        Column::RevenueUsd => num(record.revenue_usd),
        Column::CustomerRating => num(record.customer_rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testkit::record;

    #[test]
    fn export_keeps_original_column_order() {
        let r = record("2022-02-10", "Europe", "Smartphone", Some(760.0));
        let frame = FilteredFrame::from_records(vec![&r]);
        let csv = export_csv(&frame).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "sale_date,year,quarter,month_num,region,country,category,product_name,\
customer_segment,customer_age_group,previous_device_os,sales_channel,payment_method,\
return_status,is_5g,unit_price_usd,discount_pct,discounted_price_usd,units_sold,\
revenue_usd,customer_rating"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2022-02-10,2022,Q1,2,Europe,"));
        assert!(row.ends_with(",760,4"));
    }

    #[test]
    fn null_cells_are_written_empty() {
        let mut r = record("2022-02-10", "Europe", "Smartphone", None);
        r.previous_device_os = None;
        r.customer_rating = None;
        let frame = FilteredFrame::from_records(vec![&r]);
        let csv = export_csv(&frame).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",,"));
        assert!(row.contains(",,Online,"));
    }

    #[test]
    fn empty_frame_exports_header_only() {
        let frame = FilteredFrame::from_records(Vec::new());
        let csv = export_csv(&frame).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("sale_date,"));
    }
}
