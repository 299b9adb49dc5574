//! Granule footprints from CMR search results (UMM-G JSON records).

use gdal::errors::GdalError;
use gdal::vector::Geometry;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

const GPOLYGONS_PATH: [&str; 5] = [
    "umm",
    "SpatialExtent",
    "HorizontalSpatialDomain",
    "Geometry",
    "GPolygons",
];

#[derive(Error, Debug)]
pub enum SpatialError {
    #[error("missing spatial metadata: {key}")]
    MissingSpatialMetadata { key: String },

    #[error("spatial metadata {key} is not an array")]
    NotAnArray { key: String },

    #[error("point {index} of polygon {polygon} is not a pair of numbers")]
    InvalidPoint { polygon: usize, index: usize },

    #[error("gdal error: {0}")]
    Gdal(#[from] GdalError),
}

fn lookup<'a>(value: &'a Value, key: &str) -> Result<&'a Value, SpatialError> {
    value.get(key).ok_or_else(|| {
        warn!(key, "spatial metadata key not found in search result");
        SpatialError::MissingSpatialMetadata {
            key: key.to_string(),
        }
    })
}

fn array<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], SpatialError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SpatialError::NotAnArray {
            key: key.to_string(),
        })
}

// Points are objects with two values, e.g. {"Longitude": .., "Latitude": ..},
// read in the order the record lists them.
fn point(value: &Value) -> Option<(f64, f64)> {
    let object = value.as_object()?;
    if object.len() != 2 {
        return None;
    }

    let mut values = object.values().map(Value::as_f64);
    Some((values.next()??, values.next()??))
}

/// Boundary rings of every GPolygon in a search result, as (x, y) pairs in
/// record order.
pub fn extract_rings(record: &Value) -> Result<Vec<Vec<(f64, f64)>>, SpatialError> {
    let mut node = record;
    for key in GPOLYGONS_PATH {
        node = lookup(node, key)?;
    }

    array(node, "GPolygons")?
        .iter()
        .enumerate()
        .map(|(polygon, descriptor)| -> Result<Vec<(f64, f64)>, SpatialError> {
            let points = lookup(lookup(descriptor, "Boundary")?, "Points")?;

            array(points, "Points")?
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    point(value).ok_or(SpatialError::InvalidPoint { polygon, index })
                })
                .collect()
        })
        .collect()
}

/// Builds a polygon whose exterior ring is `ring`, unchanged. The ring is not
/// closed or validated here.
pub fn polygon_from_ring(ring: &[(f64, f64)]) -> Result<Geometry, SpatialError> {
    let wkt = if ring.is_empty() {
        "POLYGON EMPTY".to_string()
    } else {
        let coords: Vec<String> = ring.iter().map(|(x, y)| format!("{} {}", x, y)).collect();
        format!("POLYGON (({}))", coords.join(", "))
    };

    Ok(Geometry::from_wkt(&wkt)?)
}

/// One polygon per GPolygon in the search result, in record order.
pub fn extract_bboxes(record: &Value) -> Result<Vec<Geometry>, SpatialError> {
    extract_rings(record)?
        .iter()
        .map(|ring| polygon_from_ring(ring))
        .collect()
}
