use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use salescope::render::print_report;
use salescope::{Session, ViewPage};

/// Explore a sales dataset from the command line: filter it, print any of
/// the derived views, and optionally export the filtered rows.
#[derive(Parser)]
#[command(name = "salescope", version, about)]
struct Cli {
    /// Input file (.csv or .json)
    input: PathBuf,

    /// Restrict to these years (comma-separated); default: all
    #[arg(long, value_delimiter = ',')]
    years: Vec<String>,

    /// Restrict to these regions (comma-separated); default: all
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Restrict to these categories (comma-separated); default: all
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    /// Page to render: overview, products, regions, customers, channels,
    /// quality; default: all pages
    #[arg(long)]
    page: Option<String>,

    /// Emit pages as JSON instead of text tables
    #[arg(long)]
    json: bool,

    /// Write the filtered rows to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut session = Session::new();
    session
        .load_path(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;

    // Start from everything selected, then narrow by whatever the user gave.
    let mut filters = session.filters().clone();
    if !cli.years.is_empty() {
        filters.years = cli.years.iter().cloned().collect();
    }
    if !cli.regions.is_empty() {
        filters.regions = cli.regions.iter().cloned().collect();
    }
    if !cli.categories.is_empty() {
        filters.categories = cli.categories.iter().cloned().collect();
    }
    session.set_filters(filters);

    let pages: Vec<ViewPage> = match &cli.page {
        Some(name) => vec![ViewPage::from_name(name)
            .with_context(|| format!("unknown page '{name}'"))?],
        None => ViewPage::ALL.to_vec(),
    };

    for page in pages {
        let report = session.view(page).context("no dataset loaded")?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
    }

    if let Some(path) = &cli.export {
        let csv = session
            .export_csv()
            .context("no dataset loaded")?
            .context("exporting filtered rows")?;
        std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
        log::info!("exported filtered rows to {}", path.display());
    }

    Ok(())
}
