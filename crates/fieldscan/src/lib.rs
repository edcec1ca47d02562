//! Fieldscan: read-only metadata inventory for field-research data trees
//!
//! Discovers geodatabase layers, shapefile-family files, tables and images
//! under one or more roots and writes one flat CSV per category describing
//! what exists, where, and in what condition. Source files are never
//! modified.
//!
//! ```no_run
//! use fieldscan::{process_tables, InventoryConfig};
//! use std::path::{Path, PathBuf};
//!
//! let config = InventoryConfig::default();
//! let report = process_tables(
//!     &[PathBuf::from("/data/field")],
//!     Path::new("/tmp/metadata_csv_xlsx_tables_metadata.csv"),
//!     &config,
//! )?;
//! println!("{} tables, {} failed", report.items, report.failed);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod pipeline;
pub mod runner;
pub mod tagger;
pub mod types;
pub mod writer;

pub use config::InventoryConfig;
pub use discover::{discover_containers, discover_files, Container};
pub use error::{ConfigError, ExtractError};
pub use extract::Extractor;
pub use pipeline::{
    process_category, process_geodatabases, process_images, process_shapefiles, process_tables,
};
pub use runner::run;
pub use tagger::find_match;
pub use types::{
    Category, DiscoveredItem, ItemStatus, MetadataRecord, MetadataTable, PipelineReport, Value,
};
pub use writer::write_table;
