//! GDAL/OGR reader behind the spatial extractors

use gdal::cpl::CslStringList;
use gdal::errors::GdalError;
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::vector::{FieldValue, Geometry, LayerAccess, OGRFieldType};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use super::LayerSummary;
use crate::config::InventoryConfig;
use crate::error::{ExtractError, Result};
use crate::extract::{summarize_date_columns, DateColumn};
use crate::geometry::{extent, geometry_type_name, ogr_type_name};

fn gdal_error(action: &'static str, item: &str) -> impl FnOnce(GdalError) -> ExtractError + '_ {
    move |source| ExtractError::Gdal {
        action,
        item: item.to_string(),
        source,
    }
}

fn open(path: &Path) -> Result<Dataset> {
    let options = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
        ..Default::default()
    };
    Dataset::open_ex(path, options).map_err(|err| ExtractError::Open {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

pub(super) fn layer_names(path: &Path) -> Result<Vec<String>> {
    let dataset = open(path)?;
    let names = dataset.layers().map(|layer| layer.name()).collect();
    Ok(names)
}

fn epsg_of(srs: &SpatialRef) -> Option<i32> {
    match srs.auth_name() {
        Ok(name) if name.eq_ignore_ascii_case("EPSG") => srs.auth_code().ok(),
        _ => None,
    }
}

/// `AUTH:CODE` when the authority is known, otherwise WKT.
fn describe(srs: &SpatialRef) -> String {
    match (srs.auth_name(), srs.auth_code()) {
        (Ok(name), Ok(code)) => format!("{}:{}", name, code),
        _ => srs.to_wkt().unwrap_or_default(),
    }
}

fn field_type_name(field_type: u32) -> &'static str {
    match field_type {
        OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 => "integer",
        OGRFieldType::OFTReal => "float",
        OGRFieldType::OFTString | OGRFieldType::OFTWideString => "string",
        OGRFieldType::OFTDate => "date",
        OGRFieldType::OFTDateTime => "datetime",
        OGRFieldType::OFTTime => "time",
        OGRFieldType::OFTBinary => "binary",
        _ => "list",
    }
}

fn value_size(value: &FieldValue) -> usize {
    match value {
        FieldValue::IntegerValue(_) | FieldValue::DateValue(_) => 4,
        FieldValue::Integer64Value(_) | FieldValue::RealValue(_) | FieldValue::DateTimeValue(_) => 8,
        FieldValue::StringValue(text) => text.len(),
        FieldValue::IntegerListValue(values) => values.len() * 4,
        FieldValue::Integer64ListValue(values) => values.len() * 8,
        FieldValue::RealListValue(values) => values.len() * 8,
        FieldValue::StringListValue(values) => values.iter().map(String::len).sum(),
    }
}

fn push_date(column: &mut DateColumn, value: &FieldValue) {
    match value {
        FieldValue::DateValue(date) => {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                column.push_native(midnight);
            }
        }
        FieldValue::DateTimeValue(datetime) => column.push_native(datetime.naive_local()),
        FieldValue::StringValue(text) => column.push_text(text.as_str()),
        _ => {}
    }
}

/// Z flag from a WKB header, ISO (`1000`/`3000` ranges) or EWKB (`0x80000000`).
fn wkb_has_z(wkb: &[u8]) -> Option<bool> {
    let (order, code) = wkb.split_first()?;
    let bytes: [u8; 4] = code.get(..4)?.try_into().ok()?;
    let code = match order {
        0 => u32::from_be_bytes(bytes),
        1 => u32::from_le_bytes(bytes),
        _ => return None,
    };
    if code & 0x8000_0000 != 0 {
        return Some(true);
    }
    Some(matches!((code & 0xFFFF) / 1000, 1 | 3))
}

fn reprojection(
    source: &SpatialRef,
    config: &InventoryConfig,
    item: &str,
) -> Result<(CoordTransform, SpatialRef)> {
    let mut source = source.clone();
    let mut target = SpatialRef::from_epsg(config.target_epsg)
        .map_err(gdal_error("building target CRS for", item))?;
    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    let transform =
        CoordTransform::new(&source, &target).map_err(gdal_error("reprojecting", item))?;
    Ok((transform, target))
}

fn repair(geometry: Geometry) -> Geometry {
    if geometry.is_valid() {
        return geometry;
    }
    match geometry.make_valid(&CslStringList::new()) {
        Ok(fixed) => fixed,
        Err(err) => {
            debug!(error = %err, "Geometry repair failed, keeping original");
            geometry
        }
    }
}

pub(super) fn summarize_layer(
    path: &Path,
    layer_name: Option<&str>,
    item: &str,
    config: &InventoryConfig,
) -> Result<LayerSummary> {
    let dataset = open(path)?;
    let mut layer = match layer_name {
        Some(name) => dataset
            .layer_by_name(name)
            .map_err(gdal_error("opening layer", item))?,
        None => dataset.layers().next().ok_or_else(|| ExtractError::Open {
            path: path.to_path_buf(),
            reason: "no layers".to_string(),
        })?,
    };

    let feature_count = layer.feature_count();
    if feature_count == 0 {
        return Err(ExtractError::NoFeatures {
            item: item.to_string(),
        });
    }

    let mut source = layer.spatial_ref().ok_or_else(|| ExtractError::NoCrs {
        item: item.to_string(),
    })?;
    if epsg_of(&source).is_none() {
        let _ = source.auto_identify_epsg();
    }

    let transform = if epsg_of(&source) == i32::try_from(config.geographic_epsg).ok() {
        Some(reprojection(&source, config, item)?)
    } else {
        None
    };
    let output_srs = transform.as_ref().map(|(_, target)| target).unwrap_or(&source);
    let crs = describe(output_srs);
    let epsg = epsg_of(output_srs);

    let mut field_names: Vec<String> = Vec::new();
    let mut field_types: Vec<String> = Vec::new();
    for field in layer.defn().fields() {
        let name = field.name();
        field_types.push(format!("{}:{}", name, field_type_name(field.field_type())));
        field_names.push(name);
    }
    let has_geometry = layer.defn().geom_fields().count() > 0;

    let date_fields: Vec<String> = config
        .date_columns
        .iter()
        .filter(|name| field_names.contains(name))
        .cloned()
        .collect();
    let mut date_columns: Vec<DateColumn> = vec![DateColumn::default(); date_fields.len()];

    let mut geometry_types = BTreeSet::new();
    let mut geometries = Vec::new();
    let mut memory_bytes = 0u64;
    let mut saw_z = false;
    let mut wkb_failed = false;

    for feature in layer.features() {
        for (name, value) in feature.fields() {
            let Some(value) = value else {
                continue;
            };
            memory_bytes += value_size(&value) as u64;
            if let Some(index) = date_fields.iter().position(|candidate| *candidate == name) {
                push_date(&mut date_columns[index], &value);
            }
        }

        let Some(geometry) = feature.geometry() else {
            continue;
        };
        let geometry = match &transform {
            Some((transform, _)) => geometry
                .transform(transform)
                .map_err(gdal_error("reprojecting", item))?,
            None => geometry.clone(),
        };
        let geometry = repair(geometry);

        match geometry.wkb() {
            Ok(bytes) => {
                memory_bytes += bytes.len() as u64;
                saw_z |= wkb_has_z(&bytes).unwrap_or(false);
            }
            Err(_) => wkb_failed = true,
        }
        if geometry.is_empty() {
            continue;
        }
        match geometry.to_geo() {
            Ok(converted) => {
                geometry_types.insert(geometry_type_name(&converted).to_string());
                geometries.push(converted);
            }
            Err(err) => {
                debug!(item, error = %err, "Geometry has no planar equivalent");
                geometry_types.insert(ogr_type_name(&geometry.geometry_name()));
            }
        }
    }

    if has_geometry {
        field_names.push("geometry".to_string());
        field_types.push("geometry:geometry".to_string());
    }

    let has_z = match (saw_z, wkb_failed) {
        (true, _) => Some(true),
        (false, true) => None,
        (false, false) => Some(false),
    };

    Ok(LayerSummary {
        crs,
        epsg,
        geometry_types: geometry_types.into_iter().collect(),
        extent: extent(geometries),
        feature_count,
        has_geometry,
        temporal: summarize_date_columns(date_columns),
        field_names,
        field_types,
        memory_bytes,
        has_z,
    })
}
