//! Tabular-file extraction for delimited text and spreadsheets
//!
//! Schema and temporal fields come from a sample of at most `row_cap` rows.
//! Delimited files are then counted in full; spreadsheets are not, so their
//! `row_count` stays empty.

use calamine::{open_workbook_auto, Data, DataType as _, Reader, XlsError, XlsxError};
use chrono::NaiveDateTime;
use fieldscan_inference::{infer_types_streaming, try_parse_datetime, InferredSchema};
use std::path::Path;
use tracing::debug;

use super::{
    begin_record, file_extension, file_name, finish, probe_access, record_file_attributes,
    record_filename_tokens, record_path_tags, record_temporal, summarize_date_columns, DateColumn, Extractor, SkipTier,
};
use crate::config::InventoryConfig;
use crate::error::{ExtractError, Result};
use crate::types::{DiscoveredItem, MetadataRecord, Value, DATETIME_FORMAT};

/// One sampled cell.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::DateTime(value) => value.format(DATETIME_FORMAT).to_string(),
        }
    }
}

/// Header plus the first rows of one table.
#[derive(Debug, Clone, Default)]
struct Sample {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sample {
    fn infer(&self) -> InferredSchema {
        let text_rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::as_text).collect::<Vec<_>>());
        infer_types_streaming(&self.columns, text_rows, self.rows.len())
    }

    /// Values of every candidate date column present in the header.
    fn date_columns(&self, candidates: &[String]) -> Vec<DateColumn> {
        candidates
            .iter()
            .filter_map(|name| self.columns.iter().position(|c| c == name))
            .map(|index| {
                let mut column = DateColumn::default();
                for row in &self.rows {
                    match row.get(index) {
                        Some(Cell::Text(text)) => column.push_text(text.as_str()),
                        Some(Cell::DateTime(value)) => column.push_native(*value),
                        Some(Cell::Empty) | None => {}
                    }
                }
                column
            })
            .collect()
    }
}

pub fn extract_table(item: &DiscoveredItem, config: &InventoryConfig) -> MetadataRecord {
    let path = item.path();
    let mut record = begin_record(vec![
        ("file_path", Value::from(path.display().to_string())),
        ("file_name", Value::from(file_name(path))),
        ("file_extension", Value::from(file_extension(path))),
    ]);

    let outcome = fill_table(&mut record, path, config);
    finish(record, item, outcome, SkipTier::Allowed)
}

fn fill_table(record: &mut MetadataRecord, path: &Path, config: &InventoryConfig) -> Result<()> {
    record_file_attributes(record, path)?;
    record_path_tags(record, path, config);
    record_filename_tokens(record, path);

    for field in [
        "row_count",
        "column_count",
        "column_names",
        "column_types",
        "sheet_count",
        "sheet_names",
    ] {
        record.set(field, Value::Null);
    }
    record.set("has_timestamp", false);
    record.set("min_date", Value::Null);
    record.set("max_date", Value::Null);

    let extension = file_extension(path);
    match extension.as_str() {
        ".csv" => {
            let sample = sample_csv(path, config.row_cap)?;
            record_schema(record, &sample, config);
            let rows = count_csv_rows(path)?;
            record.set("row_count", rows);
        }
        ".xlsx" | ".xls" => {
            let (sheet_names, sample) = sample_workbook(path, config.row_cap)?;
            record.set("sheet_count", sheet_names.len());
            record.set("sheet_names", sheet_names.join(", "));
            record_schema(record, &sample, config);
        }
        _ => return Err(ExtractError::UnsupportedFileType(extension)),
    }
    Ok(())
}

fn record_schema(record: &mut MetadataRecord, sample: &Sample, config: &InventoryConfig) {
    let schema = sample.infer();
    let types: Vec<String> = schema
        .columns
        .iter()
        .map(|(name, dtype)| format!("{}:{}", name, dtype))
        .collect();

    record.set("column_count", sample.columns.len());
    record.set("column_names", sample.columns.join(", "));
    record.set("column_types", types.join(", "));

    let summary = summarize_date_columns(sample.date_columns(&config.date_columns));
    record_temporal(record, &summary);
}

fn csv_error(path: &Path, source: csv::Error) -> ExtractError {
    ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Header and up to `row_cap` records. Short records are padded with empty
/// cells; a record wider than the header ends the sample and is reported by
/// the full count.
fn sample_csv(path: &Path, row_cap: usize) -> Result<Sample> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, err))?;

    let columns: Vec<String> = reader
        .byte_headers()
        .map_err(|err| csv_error(path, err))?
        .iter()
        .map(lossy)
        .map(|name| name.trim_start_matches('\u{feff}').to_string())
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(ExtractError::NoColumns {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.byte_records().take(row_cap) {
        let record = match record {
            Ok(record) if record.len() <= columns.len() => record,
            Ok(record) => {
                debug!(path = %path.display(), fields = record.len(), "Sample ended at wide record");
                break;
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Sample ended at malformed record");
                break;
            }
        };
        let mut row: Vec<Cell> = record
            .iter()
            .map(|field| match lossy(field) {
                text if text.is_empty() => Cell::Empty,
                text => Cell::Text(text),
            })
            .collect();
        row.resize(columns.len(), Cell::Empty);
        rows.push(row);
    }

    Ok(Sample { columns, rows })
}

/// Data records in the whole file, header excluded. Short records count;
/// a record with more fields than the header is malformed.
fn count_csv_rows(path: &Path) -> Result<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, err))?;
    let expected = reader
        .byte_headers()
        .map_err(|err| csv_error(path, err))?
        .len();

    let mut record = csv::ByteRecord::new();
    let mut count = 0u64;
    while reader
        .read_byte_record(&mut record)
        .map_err(|err| csv_error(path, err))?
    {
        if record.len() > expected {
            return Err(ExtractError::TooManyFields {
                path: path.to_path_buf(),
                line: record.position().map(|pos| pos.line()).unwrap_or(count + 2),
                expected,
                found: record.len(),
            });
        }
        count += 1;
    }
    Ok(count)
}

/// Calamine wraps I/O failures per format; unwrap them so permission
/// problems keep their own tier.
fn spreadsheet_error(path: &Path, source: calamine::Error) -> ExtractError {
    match source {
        calamine::Error::Io(err)
        | calamine::Error::Xlsx(XlsxError::Io(err))
        | calamine::Error::Xls(XlsError::Io(err)) => ExtractError::from_io(path, err),
        source => ExtractError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn cell_of(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) if text.is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Int(value) => Cell::Text(value.to_string()),
        Data::Float(value) => Cell::Text(value.to_string()),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::DateTime(_) => data
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(text) => try_parse_datetime(text)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(text.clone())),
        Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}

/// Sheet names plus a sample of the first sheet.
fn sample_workbook(path: &Path, row_cap: usize) -> Result<(Vec<String>, Sample)> {
    probe_access(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|err| spreadsheet_error(path, err))?;
    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ExtractError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|err| spreadsheet_error(path, err))?;
    let mut rows = range.rows();

    let columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| match cell_of(cell).as_text() {
                    name if name.is_empty() => format!("column_{}", i + 1),
                    name => name,
                })
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .take(row_cap)
        .map(|row| row.iter().map(cell_of).collect())
        .collect();

    Ok((sheet_names, Sample { columns, rows }))
}

pub struct TableExtractor<'a> {
    config: &'a InventoryConfig,
}

impl<'a> TableExtractor<'a> {
    pub fn new(config: &'a InventoryConfig) -> Self {
        Self { config }
    }
}

impl Extractor for TableExtractor<'_> {
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord {
        extract_table(item, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemStatus;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn extract(path: &Path) -> MetadataRecord {
        extract_table(&DiscoveredItem::file(path), &InventoryConfig::default())
    }

    #[test]
    fn test_csv_schema_and_dates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Dugong-Survey_2021.csv");
        fs::write(
            &path,
            "id,Date_,count\n1,31/05/2021,4\n2,01/06/2021,7\n3,,2\n",
        )
        .unwrap();

        let record = extract(&path);
        assert_eq!(record.status(), Some(ItemStatus::Success), "{:?}", record.error());
        assert_eq!(record.get("row_count"), Some(&Value::Int(3)));
        assert_eq!(record.get("column_count"), Some(&Value::Int(3)));
        assert_eq!(record.text("column_names"), Some("id, Date_, count"));
        assert_eq!(
            record.text("column_types"),
            Some("id:integer, Date_:date, count:integer")
        );
        assert_eq!(record.get("has_timestamp"), Some(&Value::Bool(true)));
        let day = |d: u32, m: u32| {
            Value::DateTime(
                NaiveDate::from_ymd_opt(2021, m, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        assert_eq!(record.get("min_date"), Some(&day(31, 5)));
        assert_eq!(record.get("max_date"), Some(&day(1, 6)));
        assert_eq!(record.get("sheet_count"), Some(&Value::Null));
        assert_eq!(record.text("Species"), Some("Dugong"));
        assert_eq!(record.text("filename_tokens"), Some("Dugong, Survey, 2021"));
    }

    #[test]
    fn test_csv_without_date_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.csv");
        fs::write(&path, "a,b\nx,1\n").unwrap();

        let record = extract(&path);
        assert_eq!(record.get("has_timestamp"), Some(&Value::Bool(false)));
        assert_eq!(record.get("min_date"), Some(&Value::Null));
        assert_eq!(record.get("max_date"), Some(&Value::Null));
    }

    #[test]
    fn test_malformed_row_fails_after_schema() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.csv");
        let mut text = String::from("a,b\n");
        for i in 0..5 {
            text.push_str(&format!("{},{}\n", i, i * 2));
        }
        text.push_str("1,2,3\n");
        fs::write(&path, text).unwrap();

        let config = InventoryConfig {
            row_cap: 3,
            ..InventoryConfig::default()
        };
        let record = extract_table(&DiscoveredItem::file(&path), &config);
        assert_eq!(record.status(), Some(ItemStatus::Failed));
        assert!(!record.error().unwrap().is_empty());
        assert_eq!(record.text("column_names"), Some("a, b"));
        assert_eq!(record.get("column_count"), Some(&Value::Int(2)));
        assert_eq!(record.get("row_count"), Some(&Value::Null));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ragged.csv");
        fs::write(&path, "a,b,c\n1,2,3\n4,5\n6,7,8\n").unwrap();

        let record = extract(&path);
        assert_eq!(record.status(), Some(ItemStatus::Success), "{:?}", record.error());
        assert_eq!(record.get("row_count"), Some(&Value::Int(3)));
        assert_eq!(record.get("column_count"), Some(&Value::Int(3)));
        assert_eq!(
            record.text("column_types"),
            Some("a:integer, b:integer, c:integer")
        );
    }

    #[test]
    fn test_wide_row_names_the_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wide.csv");
        fs::write(&path, "a,b\n1,2\n3,4,5\n").unwrap();

        let record = extract(&path);
        assert_eq!(record.status(), Some(ItemStatus::Failed));
        assert_eq!(
            record.error(),
            Some(format!("Expected 2 fields in line 3 of {}, saw 3", path.display()).as_str())
        );
    }

    #[test]
    fn test_wrapped_spreadsheet_permission_error_is_skipped() {
        let denied = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let path = Path::new("/data/locked.xlsx");

        let xlsx = spreadsheet_error(path, calamine::Error::Xlsx(XlsxError::Io(denied())));
        assert!(matches!(xlsx, ExtractError::PermissionDenied { .. }));
        assert_eq!(xlsx.tier(), ItemStatus::Skipped);

        let xls = spreadsheet_error(path, calamine::Error::Xls(XlsError::Io(denied())));
        assert_eq!(xls.tier(), ItemStatus::Skipped);

        let broken = spreadsheet_error(
            path,
            calamine::Error::Xlsx(XlsxError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "bad zip",
            ))),
        );
        assert_eq!(broken.tier(), ItemStatus::Failed);
    }

    #[test]
    fn test_unsupported_extension_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let record = extract(&path);
        assert_eq!(record.status(), Some(ItemStatus::Failed));
        assert_eq!(record.error(), Some("Unsupported file type: .txt"));
        assert!(record.contains("file_size_mb"));
    }

    #[test]
    fn test_empty_csv_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let record = extract(&path);
        assert_eq!(record.status(), Some(ItemStatus::Failed));
        assert!(record.error().unwrap().contains("no columns"));
    }

    #[test]
    fn test_spreadsheet_cells() {
        assert_eq!(cell_of(&Data::Empty), Cell::Empty);
        assert_eq!(cell_of(&Data::Int(4)), Cell::Text("4".to_string()));
        assert_eq!(
            cell_of(&Data::DateTimeIso("2021-05-31T10:00:00".to_string())),
            Cell::DateTime(
                NaiveDate::from_ymd_opt(2021, 5, 31)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap()
            )
        );
    }
}
