//! Spatial-layer extraction for database layers and shapefile-family files
//!
//! Both share one field set: CRS, extents, geometry types, feature and
//! attribute counts, temporal extent, path tags, a memory estimate and a
//! best-effort Z flag. The GDAL/OGR reader lives behind the `spatial`
//! feature; without it every spatial item fails with a clear reason.

#[cfg(feature = "spatial")]
mod ogr;

use std::path::Path;
use tracing::debug;

use super::{begin_record, finish, probe_access, record_path_tags, record_temporal, SkipTier};
use super::Extractor;
use crate::config::InventoryConfig;
use crate::discover::Container;
use crate::error::Result;
#[cfg(not(feature = "spatial"))]
use crate::error::ExtractError;
use crate::geometry::{format_bbox, format_corners, Extent};
use crate::tagger::first_word;
use crate::types::{round_to, DiscoveredItem, MetadataRecord, Value};
use fieldscan_inference::TemporalSummary;

/// Everything read from one layer before it is written to a record.
#[derive(Debug, Clone)]
pub(crate) struct LayerSummary {
    pub crs: String,
    pub epsg: Option<i32>,
    /// Sorted, distinct
    pub geometry_types: Vec<String>,
    pub extent: Option<Extent>,
    pub feature_count: u64,
    pub has_geometry: bool,
    pub temporal: TemporalSummary,
    pub field_names: Vec<String>,
    pub field_types: Vec<String>,
    pub memory_bytes: u64,
    /// `None` when the geometry encoding could not be inspected
    pub has_z: Option<bool>,
}

/// Expand a container into one item per layer. A container whose layers
/// cannot be listed still yields one item without a layer name.
pub fn list_layers(container: &Container) -> Vec<DiscoveredItem> {
    let names = layer_names(&container.path);
    debug!(container = %container.path.display(), layers = names.len(), "Listed layers");

    if names.is_empty() {
        return vec![DiscoveredItem::Layer {
            container: container.path.clone(),
            container_name: container.name.clone(),
            layer: None,
        }];
    }

    names
        .into_iter()
        .map(|layer| DiscoveredItem::Layer {
            container: container.path.clone(),
            container_name: container.name.clone(),
            layer: Some(layer),
        })
        .collect()
}

#[cfg(feature = "spatial")]
fn layer_names(path: &Path) -> Vec<String> {
    match ogr::layer_names(path) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(container = %path.display(), error = %err, "Cannot list layers");
            Vec::new()
        }
    }
}

#[cfg(not(feature = "spatial"))]
fn layer_names(_path: &Path) -> Vec<String> {
    Vec::new()
}

#[cfg(feature = "spatial")]
fn summarize_layer(
    path: &Path,
    layer: Option<&str>,
    item: &DiscoveredItem,
    config: &InventoryConfig,
) -> Result<LayerSummary> {
    ogr::summarize_layer(path, layer, &item.to_string(), config)
}

#[cfg(not(feature = "spatial"))]
fn summarize_layer(
    _path: &Path,
    _layer: Option<&str>,
    item: &DiscoveredItem,
    _config: &InventoryConfig,
) -> Result<LayerSummary> {
    Err(ExtractError::SpatialUnavailable {
        item: item.to_string(),
    })
}

/// `crs` through `field_types`, in output order.
fn record_layer_fields(record: &mut MetadataRecord, summary: &LayerSummary) {
    record.set("crs", summary.crs.as_str());
    record.set("epsg", summary.epsg);
    record.set("geometry_types", summary.geometry_types.join(", "));
    record.set(
        "bbox",
        summary.extent.as_ref().map(|e| format_bbox(&e.bbox)),
    );
    record.set(
        "obb_bbox",
        summary.extent.as_ref().map(|e| format_corners(&e.obb)),
    );
    record.set("feature_count", summary.feature_count);
    record.set("has_geometry", summary.has_geometry);
    record_temporal(record, &summary.temporal);
    record.set("field_count", summary.field_names.len());
    record.set("field_names", summary.field_names.join(", "));
    record.set("field_types", summary.field_types.join(", "));
}

/// Path tags, memory estimate and Z flag.
fn record_layer_tail(
    record: &mut MetadataRecord,
    path: &Path,
    summary: &LayerSummary,
    config: &InventoryConfig,
) {
    record_path_tags(record, path, config);
    record.set(
        "memory_mb",
        round_to(summary.memory_bytes as f64 / (1024.0 * 1024.0), 3),
    );
    record.set(
        "has_z",
        summary.has_z.map(Value::Bool).unwrap_or(Value::Unknown),
    );
}

/// Extract one layer of a database container.
pub fn extract_geodatabase_layer(item: &DiscoveredItem, config: &InventoryConfig) -> MetadataRecord {
    let (container_name, layer) = match item {
        DiscoveredItem::Layer {
            container_name,
            layer,
            ..
        } => (container_name.clone(), layer.clone()),
        DiscoveredItem::File { .. } => (String::new(), None),
    };
    let path = item.path();

    let mut record = begin_record(vec![
        ("geodatabase", Value::from(path.display().to_string())),
        ("gdb_name", Value::from(container_name)),
        ("layer", Value::from(layer.clone())),
    ]);

    let outcome = probe_access(path)
        .and_then(|()| summarize_layer(path, layer.as_deref(), item, config))
        .map(|summary| {
            record_layer_fields(&mut record, &summary);
            record.set("first_word", layer.as_deref().and_then(first_word));
            record_layer_tail(&mut record, path, &summary, config);
        });

    finish(record, item, outcome, SkipTier::Allowed)
}

/// Extract the first layer of a shapefile-family file.
pub fn extract_shapefile(item: &DiscoveredItem, config: &InventoryConfig) -> MetadataRecord {
    let path = item.path();
    let layer_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut record = begin_record(vec![
        ("shapefile_path", Value::from(path.display().to_string())),
        ("layer_name", Value::from(layer_name)),
    ]);

    let outcome = probe_access(path)
        .and_then(|()| summarize_layer(path, None, item, config))
        .map(|summary| {
            record_layer_fields(&mut record, &summary);
            record_layer_tail(&mut record, path, &summary, config);
        });

    finish(record, item, outcome, SkipTier::Allowed)
}

pub struct GeodatabaseLayerExtractor<'a> {
    config: &'a InventoryConfig,
}

impl<'a> GeodatabaseLayerExtractor<'a> {
    pub fn new(config: &'a InventoryConfig) -> Self {
        Self { config }
    }
}

impl Extractor for GeodatabaseLayerExtractor<'_> {
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord {
        extract_geodatabase_layer(item, self.config)
    }
}

pub struct ShapefileExtractor<'a> {
    config: &'a InventoryConfig,
}

impl<'a> ShapefileExtractor<'a> {
    pub fn new(config: &'a InventoryConfig) -> Self {
        Self { config }
    }
}

impl Extractor for ShapefileExtractor<'_> {
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord {
        extract_shapefile(item, self.config)
    }
}
