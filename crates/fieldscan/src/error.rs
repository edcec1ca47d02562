//! Error types for extraction and configuration

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::ItemStatus;

/// Per-item extraction error. Never crosses the runner boundary: extractors
/// fold it into the record's `status` and `error` fields.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{item} has no features")]
    NoFeatures { item: String },

    #[error("{item} has no CRS defined")]
    NoCrs { item: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Expected {expected} fields in line {line} of {}, saw {found}", path.display())]
    TooManyFields {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Spreadsheet error in {}: {source}", path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("{} has no columns", path.display())]
    NoColumns { path: PathBuf },

    #[error("{} has no sheets", path.display())]
    EmptyWorkbook { path: PathBuf },

    #[error("Image error in {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} has zero height", path.display())]
    ZeroHeight { path: PathBuf },

    #[cfg(feature = "spatial")]
    #[error("GDAL error while {action} {item}: {source}")]
    Gdal {
        action: &'static str,
        item: String,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("spatial support not compiled in: {item}")]
    SpatialUnavailable { item: String },
}

impl ExtractError {
    /// Classify an I/O error on `path`; permission problems are their own tier.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            ExtractError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Default status for this error. Extractors without a skipped tier
    /// downgrade `Skipped` to `Failed`.
    pub fn tier(&self) -> ItemStatus {
        match self {
            ExtractError::PermissionDenied { .. } | ExtractError::Open { .. } => {
                ItemStatus::Skipped
            }
            ExtractError::Csv { source, .. } => match source.kind() {
                csv::ErrorKind::Io(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                    ItemStatus::Skipped
                }
                _ => ItemStatus::Failed,
            },
            _ => ItemStatus::Failed,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ExtractError>;
