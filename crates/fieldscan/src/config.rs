//! Inventory configuration
//!
//! Vocabularies, suffix lists and projection constants. Every field has a
//! default, so a config file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration shared by all pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Subject terms, written to the `Species` column. First match wins.
    pub subject_vocabulary: Vec<String>,

    /// Activity terms, written to the `activity` column. First match wins.
    pub activity_vocabulary: Vec<String>,

    /// Columns scanned for the temporal extent
    pub date_columns: Vec<String>,

    /// Image file name suffixes. Matched literally and case-sensitively.
    pub image_suffixes: Vec<String>,

    /// Shapefile-family suffixes
    pub shapefile_suffixes: Vec<String>,

    /// Tabular file suffixes
    pub table_suffixes: Vec<String>,

    /// Directory name suffix of database containers
    pub geodatabase_suffix: String,

    /// Layers in this EPSG code are reprojected to `target_epsg`
    pub geographic_epsg: u32,

    /// Projected EPSG code used for geographic layers
    pub target_epsg: u32,

    /// Rows read for schema inference
    pub row_cap: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_subject_vocabulary() -> Vec<String> {
    strings(&[
        "Corals",
        "Dugong",
        "Turtles",
        "Flying Fish",
        "Flora And Fauna",
        "Bird",
        "Cetaceans",
    ])
}

fn default_activity_vocabulary() -> Vec<String> {
    strings(&[
        "Restoration",
        "Survey",
        "Study",
        "Species Management",
        "Species_Recovery",
    ])
}

fn default_date_columns() -> Vec<String> {
    strings(&["Timestamp", "Date_", "StartDate", "EndDate"])
}

// Matched literally: "gif" also matches "foo.agif", ".JPEG" only upper case.
fn default_image_suffixes() -> Vec<String> {
    strings(&[
        ".png", ".jpg", ".cr2", "gif", "bmp", ".tif", "webp", ".heic", ".jpeg", ".JPEG", ".JPG",
    ])
}

fn default_shapefile_suffixes() -> Vec<String> {
    strings(&[".shp", ".gpkg"])
}

fn default_table_suffixes() -> Vec<String> {
    strings(&[".csv", ".xlsx", ".xls"])
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            subject_vocabulary: default_subject_vocabulary(),
            activity_vocabulary: default_activity_vocabulary(),
            date_columns: default_date_columns(),
            image_suffixes: default_image_suffixes(),
            shapefile_suffixes: default_shapefile_suffixes(),
            table_suffixes: default_table_suffixes(),
            geodatabase_suffix: "gdb".to_string(),
            geographic_epsg: 4326,
            target_epsg: 32636,
            row_cap: 1000,
        }
    }
}

impl InventoryConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: InventoryConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_cap == 0 {
            return Err(ConfigError::Invalid("row_cap must be at least 1".to_string()));
        }
        if self.geodatabase_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "geodatabase_suffix must not be empty".to_string(),
            ));
        }
        if self
            .image_suffixes
            .iter()
            .chain(&self.shapefile_suffixes)
            .chain(&self.table_suffixes)
            .any(String::is_empty)
        {
            return Err(ConfigError::Invalid(
                "file suffixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
