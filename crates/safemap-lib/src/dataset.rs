//! Segment records and the GeoJSON ingest that produces them.
//!
//! A dataset is a GeoJSON `FeatureCollection`. Every feature becomes one
//! [`SegmentRecord`] and keeps its position in the collection, because that
//! ordinal is how a planned route refers back to its source segments.
//! Only `LineString` features take part in routing; the graph builder skips
//! everything else.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use geojson::{Feature, GeoJson, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::Coordinate;

/// Names of the feature properties that feed the edge attributes.
///
/// The two weight fields are summed into the edge weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub primary_weight_field: String,
    pub secondary_weight_field: String,
    pub length_field: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            primary_weight_field: "weight".to_string(),
            secondary_weight_field: "weight_light".to_string(),
            length_field: "length".to_string(),
        }
    }
}

/// Geometry carried by a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A simple line; routing uses its first and last coordinate.
    LineString(Vec<Coordinate>),
    /// Any other GeoJSON geometry type, kept only so ordinals stay aligned.
    Other { kind: String },
}

impl Geometry {
    /// First and last coordinate of a line with at least two coordinates.
    pub fn line_endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        match self {
            Geometry::LineString(coords) if coords.len() >= 2 => {
                Some((coords[0], coords[coords.len() - 1]))
            }
            _ => None,
        }
    }

    /// GeoJSON type name.
    pub fn kind(&self) -> &str {
        match self {
            Geometry::LineString(_) => "LineString",
            Geometry::Other { kind } => kind,
        }
    }
}

/// One input segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub geometry: Geometry,
    pub primary_weight: f64,
    pub secondary_weight: f64,
    pub length: f64,
    /// All source properties, retained for export.
    pub properties: Map<String, Value>,
}

impl SegmentRecord {
    /// Build a line record without extra properties.
    pub fn line(
        coords: Vec<Coordinate>,
        primary_weight: f64,
        secondary_weight: f64,
        length: f64,
    ) -> Self {
        Self {
            geometry: Geometry::LineString(coords),
            primary_weight,
            secondary_weight,
            length,
            properties: Map::new(),
        }
    }

    /// Combined desirability weight of the segment.
    pub fn weight(&self) -> f64 {
        self.primary_weight + self.secondary_weight
    }
}

/// Load segment records from a GeoJSON file.
pub fn load_records(path: &Path, mapping: &FieldMapping) -> Result<Vec<SegmentRecord>> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "loading segment dataset");
    let file = File::open(path)?;
    let records = records_from_reader(BufReader::new(file), mapping)?;
    info!(
        path = %path.display(),
        records = records.len(),
        "loaded segment dataset"
    );
    Ok(records)
}

/// Parse segment records from any reader holding a GeoJSON feature collection.
///
/// Line features must carry all three mapped properties as numbers. Other
/// features are never routed over, so missing properties on them default
/// to zero.
pub fn records_from_reader<R: Read>(reader: R, mapping: &FieldMapping) -> Result<Vec<SegmentRecord>> {
    let document: GeoJson =
        serde_json::from_reader(reader).map_err(|err| Error::DatasetFormat {
            message: format!("not a GeoJSON document: {err}"),
        })?;

    let collection = match document {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(_) => return Err(expected_collection("a Feature")),
        GeoJson::Geometry(_) => return Err(expected_collection("a Geometry")),
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(orig_idx, feature)| parse_feature(orig_idx, feature, mapping))
        .collect()
}

fn expected_collection(found: &str) -> Error {
    Error::DatasetFormat {
        message: format!("expected a FeatureCollection, found {found}"),
    }
}

fn parse_feature(orig_idx: usize, feature: Feature, mapping: &FieldMapping) -> Result<SegmentRecord> {
    let geometry = match feature.geometry.map(|geometry| geometry.value) {
        Some(GeoJsonValue::LineString(positions)) => {
            Geometry::LineString(parse_positions(orig_idx, &positions)?)
        }
        Some(other) => Geometry::Other {
            kind: other.type_name().to_string(),
        },
        None => Geometry::Other {
            kind: "null".to_string(),
        },
    };
    let properties = feature.properties.unwrap_or_default();
    let required = matches!(geometry, Geometry::LineString(_));

    let field = |name: &str| -> Result<f64> {
        match properties.get(name).and_then(Value::as_f64) {
            Some(value) => Ok(value),
            None if !required => Ok(0.0),
            None => Err(Error::MissingField {
                orig_idx,
                field: name.to_string(),
            }),
        }
    };

    Ok(SegmentRecord {
        primary_weight: field(&mapping.primary_weight_field)?,
        secondary_weight: field(&mapping.secondary_weight_field)?,
        length: field(&mapping.length_field)?,
        geometry,
        properties,
    })
}

fn parse_positions(orig_idx: usize, positions: &[Vec<f64>]) -> Result<Vec<Coordinate>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coordinate { x: *x, y: *y }),
            _ => Err(Error::DatasetFormat {
                message: format!("feature {orig_idx} has a LineString position with fewer than two values"),
            }),
        })
        .collect()
}
