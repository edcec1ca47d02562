//! Table writer
//!
//! Comma-delimited UTF-8 with a header row. Columns are the first-seen union
//! of record fields; a missing field is an empty cell.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::MetadataTable;

/// Write `table` to `destination`, creating parent directories. A table
/// with no columns produces an empty file.
pub fn write_table(table: &MetadataTable, destination: &Path) -> csv::Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(destination)?;
    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
        for index in 0..table.len() {
            if let Some(row) = table.row(index) {
                writer.write_record(&row)?;
            }
        }
    }
    writer.flush()?;

    info!(
        path = %destination.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Wrote metadata table"
    );
    Ok(())
}
