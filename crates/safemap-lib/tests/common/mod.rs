#![allow(dead_code)]

use std::path::{Path, PathBuf};

use safemap_lib::{Coordinate, Geometry, SegmentRecord};
use serde_json::{json, Value};

/// Straight line record with the weight in the primary component.
pub fn line(from: (f64, f64), to: (f64, f64), length: f64, weight: f64) -> SegmentRecord {
    SegmentRecord::line(vec![from.into(), to.into()], weight, 0.0, length)
}

/// Weight cycle used by [`grid_records`]; every value keeps all three mode
/// costs finite.
const GRID_WEIGHTS: [f64; 5] = [-0.25, 0.0, 0.5, 1.0, 1.5];

/// Position of grid node `(i, j)`, nudged so no two nodes share an axis value.
pub fn grid_position(i: usize, j: usize, spacing: f64) -> Coordinate {
    let nudge = |a: usize, b: usize| ((a * 31 + b * 17) % 97) as f64 * 1e-3;
    Coordinate::new(
        i as f64 * spacing + nudge(i, j),
        j as f64 * spacing + nudge(j, i),
    )
}

/// A `size` x `size` street grid with horizontal and vertical segments.
pub fn grid_records(size: usize, spacing: f64) -> Vec<SegmentRecord> {
    let mut records = Vec::new();
    for i in 0..size {
        for j in 0..size {
            let here = grid_position(i, j, spacing);
            let weight = GRID_WEIGHTS[(i * 7 + j * 3) % GRID_WEIGHTS.len()];
            if i + 1 < size {
                let there = grid_position(i + 1, j, spacing);
                records.push(SegmentRecord::line(
                    vec![here, there],
                    weight,
                    0.0,
                    here.distance_to(&there),
                ));
            }
            if j + 1 < size {
                let there = grid_position(i, j + 1, spacing);
                records.push(SegmentRecord::line(
                    vec![here, there],
                    0.0,
                    weight,
                    here.distance_to(&there),
                ));
            }
        }
    }
    records
}

/// GeoJSON feature collection for `records` using the default field names.
pub fn feature_collection(records: &[SegmentRecord]) -> Value {
    let features: Vec<Value> = records
        .iter()
        .map(|record| {
            let geometry = match &record.geometry {
                Geometry::LineString(coords) => json!({
                    "type": "LineString",
                    "coordinates": coords.iter().map(|c| [c.x, c.y]).collect::<Vec<_>>(),
                }),
                Geometry::Other { kind } => json!({ "type": kind, "coordinates": [0.0, 0.0] }),
            };
            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "weight": record.primary_weight,
                    "weight_light": record.secondary_weight,
                    "length": record.length,
                },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Write `records` as a GeoJSON file named `name` inside `dir`.
pub fn write_dataset(dir: &Path, name: &str, records: &[SegmentRecord]) -> PathBuf {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(&feature_collection(records)).expect("serialize");
    std::fs::write(&path, body).expect("write dataset");
    path
}
