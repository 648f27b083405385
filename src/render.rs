//! Plain-text rendering of view tables for the CLI.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table as TextTable};

use crate::view::{Table, ViewReport};

/// Render one view table as a bordered text table.
pub fn render_table(table: &Table) -> TextTable {
    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.headers.clone());
    for row in &table.rows {
        out.add_row(row.clone());
    }
    out
}

/// Print a whole page to stdout.
pub fn print_report(report: &ViewReport) {
    println!("== {} ==", report.page.label());
    if report.no_data {
        println!("no data for this view; broaden the filters\n");
        return;
    }
    for table in &report.tables {
        println!("{}", table.title);
        println!("{}\n", render_table(table));
    }
}
