//! Category pipelines: discover, extract, write
//!
//! Each `process_*` function runs one category end to end and writes one
//! CSV. Per-item problems end up in the table; only a failure to write the
//! output is returned as an error.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::InventoryConfig;
use crate::discover::{discover_containers, discover_files};
use crate::extract::{
    list_layers, GeodatabaseLayerExtractor, ImageExtractor, ShapefileExtractor, TableExtractor,
};
use crate::runner::run;
use crate::types::{Category, DiscoveredItem, MetadataTable, PipelineReport};
use crate::writer::write_table;

fn finish(
    category: Category,
    items: &[DiscoveredItem],
    table: MetadataTable,
    output_csv: &Path,
) -> Result<PipelineReport> {
    write_table(&table, output_csv)
        .with_context(|| format!("Failed to write {}", output_csv.display()))?;
    let report = PipelineReport::from_table(category, output_csv.to_path_buf(), &table);
    info!(
        category = %category,
        discovered = items.len(),
        output = %output_csv.display(),
        "{} metadata written",
        category
    );
    Ok(report)
}

/// Every layer of every database container under `roots`.
pub fn process_geodatabases(
    roots: &[PathBuf],
    output_csv: &Path,
    config: &InventoryConfig,
) -> Result<PipelineReport> {
    let containers = discover_containers(roots, &config.geodatabase_suffix);
    let items: Vec<DiscoveredItem> = containers.iter().flat_map(list_layers).collect();
    info!(containers = containers.len(), layers = items.len(), "Discovered geodatabase layers");

    let table = run(&items, &GeodatabaseLayerExtractor::new(config), "Geodatabase layers");
    finish(Category::Geodatabases, &items, table, output_csv)
}

pub fn process_shapefiles(
    roots: &[PathBuf],
    output_csv: &Path,
    config: &InventoryConfig,
) -> Result<PipelineReport> {
    let items = discover_files(roots, &config.shapefile_suffixes);
    let table = run(&items, &ShapefileExtractor::new(config), "Shapefiles");
    finish(Category::Shapefiles, &items, table, output_csv)
}

pub fn process_tables(
    roots: &[PathBuf],
    output_csv: &Path,
    config: &InventoryConfig,
) -> Result<PipelineReport> {
    let items = discover_files(roots, &config.table_suffixes);
    let table = run(&items, &TableExtractor::new(config), "Tables");
    finish(Category::Tables, &items, table, output_csv)
}

pub fn process_images(
    roots: &[PathBuf],
    output_csv: &Path,
    config: &InventoryConfig,
) -> Result<PipelineReport> {
    let items = discover_files(roots, &config.image_suffixes);
    let table = run(&items, &ImageExtractor::new(config), "Images");
    finish(Category::Images, &items, table, output_csv)
}

/// Run one category, writing `<output_dir>/<prefix>_<category file>`.
pub fn process_category(
    category: Category,
    roots: &[PathBuf],
    output_dir: &Path,
    prefix: &str,
    config: &InventoryConfig,
) -> Result<PipelineReport> {
    let output_csv = output_dir.join(category.output_file_name(prefix));
    match category {
        Category::Geodatabases => process_geodatabases(roots, &output_csv, config),
        Category::Shapefiles => process_shapefiles(roots, &output_csv, config),
        Category::Tables => process_tables(roots, &output_csv, config),
        Category::Images => process_images(roots, &output_csv, config),
    }
}
