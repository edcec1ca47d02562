//! Output formatting for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

use crate::types::PipelineReport;

/// Print a table with a cyan header row
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", build_table(headers, rows));
}

fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }
    table
}

pub const REPORT_HEADERS: [&str; 6] = ["CATEGORY", "ITEMS", "SUCCESS", "SKIPPED", "FAILED", "OUTPUT"];

pub fn report_rows(reports: &[PipelineReport]) -> Vec<Vec<String>> {
    reports
        .iter()
        .map(|r| {
            vec![
                r.category.to_string(),
                r.items.to_string(),
                r.success.to_string(),
                r.skipped.to_string(),
                r.failed.to_string(),
                r.output.display().to_string(),
            ]
        })
        .collect()
}
