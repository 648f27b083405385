use std::fmt;

// ---------------------------------------------------------------------------
// Closed column schema
// ---------------------------------------------------------------------------

/// Declared type of a column in the sales schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Category,
    Number,
}

/// The fixed set of columns a sales file may carry, in original file order.
///
/// Every lookup that the original data source did by string name goes through
/// this enumeration instead, so a typo in a column reference is a compile
/// error rather than a runtime KeyError.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SaleDate,
    Year,
    Quarter,
    MonthNum,
    Region,
    Country,
    Category,
    ProductName,
    CustomerSegment,
    CustomerAgeGroup,
    PreviousDeviceOs,
    SalesChannel,
    PaymentMethod,
    ReturnStatus,
    Is5g,
    UnitPriceUsd,
    DiscountPct,
    DiscountedPriceUsd,
    UnitsSold,
    RevenueUsd,
    CustomerRating,
}

impl Column {
    /// All columns in original file order. Export writes them in this order.
    pub const ALL: [Column; 21] = [
        Column::SaleDate,
        Column::Year,
        Column::Quarter,
        Column::MonthNum,
        Column::Region,
        Column::Country,
        Column::Category,
        Column::ProductName,
        Column::CustomerSegment,
        Column::CustomerAgeGroup,
        Column::PreviousDeviceOs,
        Column::SalesChannel,
        Column::PaymentMethod,
        Column::ReturnStatus,
        Column::Is5g,
        Column::UnitPriceUsd,
        Column::DiscountPct,
        Column::DiscountedPriceUsd,
        Column::UnitsSold,
        Column::RevenueUsd,
        Column::CustomerRating,
    ];

    /// The column's header name in the tabular source.
    pub fn name(self) -> &'static str {
        match self {
            Column::SaleDate => "sale_date",
            Column::Year => "year",
            Column::Quarter => "quarter",
            Column::MonthNum => "month_num",
            Column::Region => "region",
            Column::Country => "country",
            Column::Category => "category",
            Column::ProductName => "product_name",
            Column::CustomerSegment => "customer_segment",
            Column::CustomerAgeGroup => "customer_age_group",
            Column::PreviousDeviceOs => "previous_device_os",
            Column::SalesChannel => "sales_channel",
            Column::PaymentMethod => "payment_method",
            Column::ReturnStatus => "return_status",
            Column::Is5g => "is_5g",
            Column::UnitPriceUsd => "unit_price_usd",
            Column::DiscountPct => "discount_pct",
            Column::DiscountedPriceUsd => "discounted_price_usd",
            Column::UnitsSold => "units_sold",
            Column::RevenueUsd => "revenue_usd",
            Column::CustomerRating => "customer_rating",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::SaleDate => ColumnKind::Date,
            Column::UnitPriceUsd
            | Column::DiscountPct
            | Column::DiscountedPriceUsd
            | Column::UnitsSold
            | Column::RevenueUsd
            | Column::CustomerRating => ColumnKind::Number,
            _ => ColumnKind::Category,
        }
    }

    /// Whether the column must be present in the input header.
    ///
    /// `year` and `month_num` are always recomputed from `sale_date`, and
    /// `quarter` is derived from the month when absent, so none of the three
    /// is required on input even though all are exported.
    pub fn required(self) -> bool {
        !matches!(self, Column::Year | Column::Quarter | Column::MonthNum)
    }

    /// Whether a blank cell in this column is a null rather than an error.
    pub fn nullable(self) -> bool {
        matches!(self, Column::PreviousDeviceOs) || self.kind() == ColumnKind::Number
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
