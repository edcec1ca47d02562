//! Core types for the inventory pipeline

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Datetime rendering used for every timestamp column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of extracting one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// All fields extracted
    Success,
    /// Expected obstruction (permission, unopenable source)
    Skipped,
    /// Anything else
    Failed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Success, ItemStatus::Skipped, ItemStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Success => "success",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ItemStatus::Success),
            "skipped" => Ok(ItemStatus::Skipped),
            "failed" => Ok(ItemStatus::Failed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// A locator produced by discovery and consumed once by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveredItem {
    /// A plain file (shapefile family, table, image)
    File { path: PathBuf },
    /// One layer of a database-style container directory
    Layer {
        container: PathBuf,
        /// Parent path segment of the container
        container_name: String,
        /// `None` when the container's layers could not be listed
        layer: Option<String>,
    },
}

impl DiscoveredItem {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DiscoveredItem::File { path: path.into() }
    }

    /// The file or container path on disk.
    pub fn path(&self) -> &Path {
        match self {
            DiscoveredItem::File { path } => path,
            DiscoveredItem::Layer { container, .. } => container,
        }
    }

    pub fn layer(&self) -> Option<&str> {
        match self {
            DiscoveredItem::File { .. } => None,
            DiscoveredItem::Layer { layer, .. } => layer.as_deref(),
        }
    }
}

impl fmt::Display for DiscoveredItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveredItem::File { path } => write!(f, "{}", path.display()),
            DiscoveredItem::Layer {
                container,
                layer: Some(layer),
                ..
            } => write!(f, "{} (layer {})", container.display(), layer),
            DiscoveredItem::Layer { container, .. } => write!(f, "{}", container.display()),
        }
    }
}

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Present column, no value (renders empty)
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// A best-effort probe could not decide
    Unknown,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text used for the CSV cell.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Unknown => "unknown".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// One item's metadata: field name to value, in insertion order.
///
/// Overwriting a field keeps its original position, so identity fields and
/// `status`/`error` stay at the front of the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: IndexMap<String, Value>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Text of a field, `None` when absent, null, or not text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Status recorded by the extractor. Records always carry one.
    pub fn status(&self) -> Option<ItemStatus> {
        self.text("status").and_then(|s| s.parse().ok())
    }

    pub fn error(&self) -> Option<&str> {
        self.text("error")
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered records plus the union of their columns in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    columns: Vec<String>,
    records: Vec<MetadataRecord>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MetadataRecord) {
        for name in record.field_names() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_status(&self, status: ItemStatus) -> usize {
        self.records
            .iter()
            .filter(|r| r.status() == Some(status))
            .count()
    }

    /// Cells of one record aligned to [`columns`](Self::columns); missing
    /// fields render empty.
    pub fn row(&self, index: usize) -> Option<Vec<String>> {
        let record = self.records.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|c| record.get(c).map(Value::render).unwrap_or_default())
                .collect(),
        )
    }
}

/// Input category. Each has its own discovery, extractor and output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Geodatabases,
    Shapefiles,
    Tables,
    Images,
}

impl Category {
    /// Pipeline order used when several categories run together.
    pub const ALL: [Category; 4] = [
        Category::Geodatabases,
        Category::Shapefiles,
        Category::Tables,
        Category::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Geodatabases => "geodatabases",
            Category::Shapefiles => "shapefiles",
            Category::Tables => "tables",
            Category::Images => "images",
        }
    }

    /// Output file name, e.g. `metadata_gdb_layer_metadata.csv`.
    pub fn output_file_name(&self, prefix: &str) -> String {
        let suffix = match self {
            Category::Geodatabases => "gdb_layer_metadata",
            Category::Shapefiles => "shp_layer_metadata",
            Category::Tables => "csv_xlsx_tables_metadata",
            Category::Images => "images_layer_metadata",
        };
        format!("{}_{}.csv", prefix, suffix)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one pipeline run, returned to the caller for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub category: Category,
    pub output: PathBuf,
    pub items: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PipelineReport {
    pub fn from_table(category: Category, output: PathBuf, table: &MetadataTable) -> Self {
        Self {
            category,
            output,
            items: table.len(),
            success: table.count_status(ItemStatus::Success),
            skipped: table.count_status(ItemStatus::Skipped),
            failed: table.count_status(ItemStatus::Failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn status_round_trips_through_text() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert!("done".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn value_rendering() {
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::Unknown.render(), "unknown");
        assert_eq!(Value::Bool(true).render(), "true");
        assert_eq!(Value::Float(0.125).render(), "0.125");
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        assert_eq!(Value::DateTime(dt).render(), "2024-03-05 07:08:09");
        assert_eq!(Value::from(None::<String>), Value::Null);
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(4.0 / 3.0, 4), 1.3333);
    }

    #[test]
    fn overwrite_keeps_field_position() {
        let mut record = MetadataRecord::new();
        record.set("file_path", "/data/a.csv");
        record.set("status", ItemStatus::Success.as_str());
        record.set("error", Value::Null);
        record.set("row_count", 3i64);
        record.set("status", ItemStatus::Failed.as_str());
        record.set("error", "broken");

        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["file_path", "status", "error", "row_count"]);
        assert_eq!(record.status(), Some(ItemStatus::Failed));
        assert_eq!(record.error(), Some("broken"));
    }

    #[test]
    fn table_columns_are_first_seen_union() {
        let mut first = MetadataRecord::new();
        first.set("a", 1i64);
        first.set("b", 2i64);
        let mut second = MetadataRecord::new();
        second.set("a", 3i64);
        second.set("c", "x");

        let mut table = MetadataTable::new();
        table.push(first);
        table.push(second);

        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.row(0).unwrap(), vec!["1", "2", ""]);
        assert_eq!(table.row(1).unwrap(), vec!["3", "", "x"]);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn output_file_names() {
        assert_eq!(
            Category::Geodatabases.output_file_name("metadata"),
            "metadata_gdb_layer_metadata.csv"
        );
        assert_eq!(
            Category::Tables.output_file_name("run1"),
            "run1_csv_xlsx_tables_metadata.csv"
        );
        assert_eq!(
            Category::Images.output_file_name("x"),
            "x_images_layer_metadata.csv"
        );
    }
}
