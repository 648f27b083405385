//! Generate a deterministic sample sales CSV for demos and manual testing.
//!
//! Usage: `cargo run --bin generate_sample [rows] [output.csv]`

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as u32
    }
}

const REGIONS: [(&str, &[&str]); 4] = [
    ("North America", &["USA", "Canada", "Mexico"]),
    ("Europe", &["Germany", "France", "UK", "Spain"]),
    ("Asia Pacific", &["South Korea", "India", "Vietnam", "Australia"]),
    ("Latin America", &["Brazil", "Argentina", "Chile"]),
];

const CATEGORIES: [(&str, &[(&str, f64, bool)]); 4] = [
    (
        "Smartphone",
        &[
            ("Galaxy S23 Ultra", 1199.0, true),
            ("Galaxy S23", 799.0, true),
            ("Galaxy A54", 449.0, true),
            ("Galaxy A14", 199.0, false),
        ],
    ),
    (
        "TV",
        &[
            ("Neo QLED 8K", 2999.0, false),
            ("Crystal UHD", 649.0, false),
            ("The Frame", 1499.0, false),
        ],
    ),
    (
        "Wearable",
        &[
            ("Galaxy Watch 6", 299.0, false),
            ("Galaxy Buds 2 Pro", 229.0, false),
        ],
    ),
    (
        "Appliance",
        &[
            ("Bespoke Refrigerator", 2199.0, false),
            ("EcoBubble Washer", 899.0, false),
        ],
    ),
];

const SEGMENTS: [&str; 3] = ["Consumer", "Business", "Education"];
const AGE_GROUPS: [&str; 5] = ["18-24", "25-34", "35-44", "45-54", "55+"];
const PREVIOUS_OS: [&str; 3] = ["Android", "iOS", "Other"];
const CHANNELS: [&str; 3] = ["Online", "Retail", "Partner"];
const PAYMENTS: [&str; 4] = ["Credit Card", "Debit Card", "UPI", "Financing"];

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let rows: usize = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("row count must be a number")?
        .unwrap_or(1000);
    let output = args.next().unwrap_or_else(|| "sample_sales.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {output}"))?;

    writer.write_record([
        "sale_date",
        "year",
        "quarter",
        "month_num",
        "region",
        "country",
        "category",
        "product_name",
        "customer_segment",
        "customer_age_group",
        "previous_device_os",
        "sales_channel",
        "payment_method",
        "return_status",
        "is_5g",
        "unit_price_usd",
        "discount_pct",
        "discounted_price_usd",
        "units_sold",
        "revenue_usd",
        "customer_rating",
    ])?;

    for _ in 0..rows {
        let year = rng.range(2021, 2023);
        let month = rng.range(1, 12);
        let day = rng.range(1, DAYS_IN_MONTH[(month - 1) as usize]);
        let quarter = (month - 1) / 3 + 1;

        let (region, countries) = rng.pick(&REGIONS);
        let country = rng.pick(countries);
        let (category, products) = rng.pick(&CATEGORIES);
        let (product, base_price, is_5g) = rng.pick(products);

        let discount_pct = *rng.pick(&[0.0, 0.0, 5.0, 10.0, 15.0, 20.0]);
        let unit_price = base_price * (0.95 + 0.1 * rng.uniform());
        let discounted = unit_price * (1.0 - discount_pct / 100.0);
        let units = rng.range(1, 3);
        let revenue = discounted * units as f64;

        let returned = rng.uniform() < 0.06;
        // Roughly the missing-data profile of the real export: some
        // customers never rate, some have no previous device.
        let rating = if rng.uniform() < 0.12 {
            String::new()
        } else {
            format!("{:.1}", 3.0 + 2.0 * rng.uniform())
        };
        let previous_os = if rng.uniform() < 0.15 {
            ""
        } else {
            rng.pick(&PREVIOUS_OS)
        };

        writer.write_record([
            format!("{year}-{month:02}-{day:02}"),
            year.to_string(),
            format!("Q{quarter}"),
            month.to_string(),
            region.to_string(),
            country.to_string(),
            category.to_string(),
            product.to_string(),
            rng.pick(&SEGMENTS).to_string(),
            rng.pick(&AGE_GROUPS).to_string(),
            previous_os.to_string(),
            rng.pick(&CHANNELS).to_string(),
            rng.pick(&PAYMENTS).to_string(),
            if returned { "Returned" } else { "Not Returned" }.to_string(),
            if *is_5g { "Yes" } else { "No" }.to_string(),
            format!("{unit_price:.2}"),
            format!("{discount_pct:.0}"),
            format!("{discounted:.2}"),
            units.to_string(),
            format!("{revenue:.2}"),
            rating,
        ])?;
    }

    writer.flush()?;
    println!("wrote {rows} rows to {output}");
    Ok(())
}
