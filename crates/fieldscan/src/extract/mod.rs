//! Per-item extractors
//!
//! Every extractor turns one [`DiscoveredItem`] into exactly one
//! [`MetadataRecord`]. Errors never escape: they are folded into the
//! record's `status` and `error` fields by [`finish`], and whatever fields
//! were set before the failure stay in the record.

pub mod images;
pub mod spatial;
pub mod tabular;

use chrono::{DateTime, Local, NaiveDateTime};
use fieldscan_inference::{parse_date_column, summarize_columns, TemporalSummary};
use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::config::InventoryConfig;
use crate::error::{ExtractError, Result};
use crate::tagger::{filename_tokens, path_tags};
use crate::types::{round_to, DiscoveredItem, ItemStatus, MetadataRecord, Value};

pub use self::images::{extract_image, ImageExtractor};
pub use self::spatial::{
    extract_geodatabase_layer, extract_shapefile, list_layers, GeodatabaseLayerExtractor,
    ShapefileExtractor,
};
pub use self::tabular::{extract_table, TableExtractor};

/// Turns one discovered item into one record. Implementations never fail.
pub trait Extractor {
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord;
}

impl<F> Extractor for F
where
    F: Fn(&DiscoveredItem) -> MetadataRecord,
{
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord {
        self(item)
    }
}

/// Whether an extractor distinguishes expected obstructions from failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipTier {
    Allowed,
    Never,
}

/// Identity fields, then `status`/`error` placeholders.
pub(crate) fn begin_record(identity: Vec<(&str, Value)>) -> MetadataRecord {
    let mut record = MetadataRecord::new();
    for (field, value) in identity {
        record.set(field, value);
    }
    record.set("status", ItemStatus::Success.as_str());
    record.set("error", Value::Null);
    record
}

/// Fold the extraction outcome into the record.
pub(crate) fn finish(
    mut record: MetadataRecord,
    item: &DiscoveredItem,
    outcome: Result<()>,
    skip: SkipTier,
) -> MetadataRecord {
    match outcome {
        Ok(()) => debug!(item = %item, "Extracted"),
        Err(err) => {
            let status = match (err.tier(), skip) {
                (ItemStatus::Skipped, SkipTier::Never) => ItemStatus::Failed,
                (status, _) => status,
            };
            warn!(item = %item, status = %status, error = %err, "Extraction did not succeed");
            record.set("status", status.as_str());
            record.set("error", err.to_string());
        }
    }
    record
}

/// Fail early with a permission error rather than a driver error.
pub(crate) fn probe_access(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|err| ExtractError::from_io(path, err))?;
    if metadata.is_dir() {
        fs::read_dir(path).map_err(|err| ExtractError::from_io(path, err))?;
    } else {
        File::open(path).map_err(|err| ExtractError::from_io(path, err))?;
    }
    Ok(())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension with its dot, or empty.
pub(crate) fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// `file_size_mb`, `created_time`, `modified_time`
pub(crate) fn record_file_attributes(record: &mut MetadataRecord, path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|err| ExtractError::from_io(path, err))?;
    record.set(
        "file_size_mb",
        round_to(metadata.len() as f64 / (1024.0 * 1024.0), 3),
    );
    record.set("created_time", metadata.created().ok().map(local_time));
    record.set("modified_time", metadata.modified().ok().map(local_time));
    Ok(())
}

/// `Species` and `activity` from the lowercased path segments.
pub(crate) fn record_path_tags(record: &mut MetadataRecord, path: &Path, config: &InventoryConfig) {
    let tags = path_tags(path, &config.subject_vocabulary, &config.activity_vocabulary);
    record.set("Species", tags.subject);
    record.set("activity", tags.activity);
}

pub(crate) fn record_filename_tokens(record: &mut MetadataRecord, path: &Path) {
    record.set("filename_tokens", filename_tokens(path));
}

/// `has_timestamp`, `min_date`, `max_date`
pub(crate) fn record_temporal(record: &mut MetadataRecord, summary: &TemporalSummary) {
    record.set("has_timestamp", summary.has_timestamp);
    record.set("min_date", summary.range.map(|r| r.min));
    record.set("max_date", summary.range.map(|r| r.max));
}

/// Values gathered for one candidate date column.
///
/// Text values are parsed together so the column resolves one day/month
/// order; native date cells are taken as they are.
#[derive(Debug, Clone, Default)]
pub(crate) struct DateColumn {
    texts: Vec<String>,
    natives: Vec<NaiveDateTime>,
}

impl DateColumn {
    pub(crate) fn push_text(&mut self, value: impl Into<String>) {
        self.texts.push(value.into());
    }

    pub(crate) fn push_native(&mut self, value: NaiveDateTime) {
        self.natives.push(value);
    }

    pub(crate) fn into_parsed(self) -> Vec<Option<NaiveDateTime>> {
        let mut parsed = parse_date_column(self.texts.as_slice());
        parsed.extend(self.natives.into_iter().map(Some));
        parsed
    }
}

/// Aggregate the candidate columns that exist in a schema.
pub(crate) fn summarize_date_columns(columns: Vec<DateColumn>) -> TemporalSummary {
    let parsed: Vec<Vec<Option<NaiveDateTime>>> =
        columns.into_iter().map(DateColumn::into_parsed).collect();
    summarize_columns(&parsed)
}
