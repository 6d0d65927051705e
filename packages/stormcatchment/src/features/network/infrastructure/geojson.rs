//! GeoJSON FeatureCollection ingestion
//!
//! Structures come from `Point` features and conduits from `LineString`
//! features. Multi-part geometries keep their first part only. The feature id
//! is read from the configured id property, then the feature `id`, then the
//! position in the collection.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, StormError};
use crate::features::network::domain::{Attributes, FeatureSet, LineFeature, PointFeature};
use crate::shared::Point;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    crs: Option<RawCrs>,
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawCrs {
    properties: RawCrsProperties,
}

#[derive(Debug, Deserialize)]
struct RawCrsProperties {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Attributes>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<Vec<f64>>),
    MultiLineString(Vec<Vec<Vec<f64>>>),
}

pub fn read_points(path: impl AsRef<Path>, id_field: &str) -> Result<FeatureSet<PointFeature>> {
    parse_points(&fs::read_to_string(path)?, id_field)
}

pub fn read_lines(path: impl AsRef<Path>, id_field: &str) -> Result<FeatureSet<LineFeature>> {
    parse_lines(&fs::read_to_string(path)?, id_field)
}

/// Point features of a FeatureCollection document
pub fn parse_points(content: &str, id_field: &str) -> Result<FeatureSet<PointFeature>> {
    let collection: RawCollection = serde_json::from_str(content)?;
    let crs = collection.crs.map(|c| c.properties.name);

    let mut features = Vec::with_capacity(collection.features.len());
    for (position, raw) in collection.features.into_iter().enumerate() {
        let id = feature_id(&raw, id_field, position)?;
        let location = match raw.geometry {
            Some(RawGeometry::Point(c)) => coordinate(&c)?,
            Some(RawGeometry::MultiPoint(parts)) => {
                if parts.len() > 1 {
                    warn!("Feature {} is a MultiPoint; using its first point", id);
                }
                match parts.first() {
                    Some(c) => coordinate(c)?,
                    None => continue,
                }
            }
            Some(_) => {
                return Err(StormError::parse(format!(
                    "feature {} is not a point geometry",
                    id
                )))
            }
            None => {
                debug!("Feature {} has no geometry; skipped", id);
                continue;
            }
        };
        features.push(PointFeature {
            id,
            location,
            attributes: raw.properties.unwrap_or_default(),
        });
    }

    Ok(FeatureSet { crs, features })
}

/// Line features of a FeatureCollection document
pub fn parse_lines(content: &str, id_field: &str) -> Result<FeatureSet<LineFeature>> {
    let collection: RawCollection = serde_json::from_str(content)?;
    let crs = collection.crs.map(|c| c.properties.name);

    let mut features = Vec::with_capacity(collection.features.len());
    for (position, raw) in collection.features.into_iter().enumerate() {
        let id = feature_id(&raw, id_field, position)?;
        let coords = match raw.geometry {
            Some(RawGeometry::LineString(c)) => c,
            Some(RawGeometry::MultiLineString(mut parts)) => {
                if parts.len() > 1 {
                    warn!("Feature {} is a MultiLineString; using its first part", id);
                }
                if parts.is_empty() {
                    continue;
                }
                parts.swap_remove(0)
            }
            Some(_) => {
                return Err(StormError::parse(format!(
                    "feature {} is not a line geometry",
                    id
                )))
            }
            None => {
                debug!("Feature {} has no geometry; skipped", id);
                continue;
            }
        };
        let vertices = coords
            .iter()
            .map(|c| coordinate(c))
            .collect::<Result<Vec<_>>>()?;
        features.push(LineFeature {
            id,
            vertices,
            attributes: raw.properties.unwrap_or_default(),
        });
    }

    Ok(FeatureSet { crs, features })
}

fn feature_id(raw: &RawFeature, id_field: &str, position: usize) -> Result<u64> {
    let candidate = raw
        .properties
        .as_ref()
        .and_then(|p| p.get(id_field))
        .filter(|v| !v.is_null())
        .or(raw.id.as_ref());

    match candidate {
        None => Ok(position as u64),
        Some(value) => value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| {
                StormError::parse(format!(
                    "feature id {} is not a non-negative integer",
                    value
                ))
            }),
    }
}

fn coordinate(c: &[f64]) -> Result<Point> {
    match c {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => Err(StormError::parse(format!(
            "coordinate needs at least two ordinates, got {}",
            c.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const POINTS: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "EPSG:32145"}},
        "features": [
            {"type": "Feature", "properties": {"OBJECTID": 7, "Type": 2},
             "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
            {"type": "Feature", "id": 9, "properties": {"Type": 5},
             "geometry": {"type": "MultiPoint", "coordinates": [[3.0, 4.0, 100.0], [5.0, 6.0]]}},
            {"type": "Feature", "properties": {"Type": 4}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_parse_points() {
        let set = parse_points(POINTS, "OBJECTID").unwrap();
        assert_eq!(set.crs.as_deref(), Some("EPSG:32145"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.features[0].id, 7);
        assert_eq!(set.features[0].location, Point::new(1.0, 2.0));
        assert_eq!(set.features[1].id, 9);
        assert_eq!(set.features[1].location, Point::new(3.0, 4.0));
        assert_eq!(set.features[1].attributes.get("Type"), Some(&Value::from(5)));
    }

    #[test]
    fn test_parse_lines_from_file() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OBJECTID": "12"},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [5, 0], [5, 5]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiLineString", "coordinates": [[[1, 1], [2, 2]]]}}
            ]
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(doc.as_bytes()).unwrap();

        let set = read_lines(file.path(), "OBJECTID").unwrap();
        assert_eq!(set.crs, None);
        assert_eq!(set.features[0].id, 12);
        assert_eq!(set.features[0].vertices.len(), 3);
        // Falls back to collection position
        assert_eq!(set.features[1].id, 1);
        assert_eq!(set.features[1].vertices[1], Point::new(2.0, 2.0));
    }

    #[test]
    fn test_wrong_geometry_kind() {
        assert!(parse_lines(POINTS, "OBJECTID").is_err());
        let short = r#"{"features": [{"geometry": {"type": "Point", "coordinates": [1]}}]}"#;
        assert!(parse_points(short, "id").is_err());
        assert!(parse_points("not json", "id").is_err());
    }
}
