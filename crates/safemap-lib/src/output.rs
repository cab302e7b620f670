use std::fmt::Write;

use geojson::{Feature, FeatureCollection, Geometry as GeoJsonGeometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::Value;

use crate::dataset::{Geometry, SegmentRecord};
use crate::error::{Error, Result};
use crate::network::{RouteResult, SnappedEndpoint};
use crate::routing::{RouteMetrics, RouteMode};

/// Segments listed by [`RouteSummary::render_text`].
const PREVIEW_SEGMENTS: usize = 5;

/// Export the records along a route as a GeoJSON `FeatureCollection`.
///
/// Features appear in traversal order. Each keeps its source properties and
/// gains a `route_order` property holding its position along the route.
pub fn route_feature_collection(
    records: &[SegmentRecord],
    orig_indices: &[usize],
) -> Result<FeatureCollection> {
    let features = orig_indices
        .iter()
        .enumerate()
        .map(|(route_order, &orig_idx)| {
            let record = records.get(orig_idx).ok_or_else(|| Error::InvalidRecord {
                orig_idx,
                message: format!("route refers to a record outside the {} loaded", records.len()),
            })?;

            let mut properties = record.properties.clone();
            properties.insert("route_order".to_string(), Value::from(route_order));

            Ok(Feature {
                bbox: None,
                geometry: line_geometry(&record.geometry),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn line_geometry(geometry: &Geometry) -> Option<GeoJsonGeometry> {
    match geometry {
        Geometry::LineString(coords) => Some(GeoJsonGeometry::new(GeoJsonValue::LineString(
            coords.iter().map(|c| vec![c.x, c.y]).collect(),
        ))),
        Geometry::Other { .. } => None,
    }
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub mode: RouteMode,
    pub start: SnappedEndpoint,
    pub end: SnappedEndpoint,
    pub orig_indices: Vec<usize>,
    pub metrics: RouteMetrics,
}

impl RouteSummary {
    pub fn from_result(result: &RouteResult) -> Self {
        Self {
            mode: result.mode,
            start: result.start.clone(),
            end: result.end.clone(),
            orig_indices: result.orig_indices.clone(),
            metrics: result.metrics.clone(),
        }
    }

    /// Multi-line plain text report.
    pub fn render_text(&self) -> String {
        let mut buffer = String::new();
        let metrics = &self.metrics;

        let _ = writeln!(
            buffer,
            "Start node: {} (distance from input: {:.2})",
            self.start.coordinate, self.start.distance
        );
        let _ = writeln!(
            buffer,
            "End node: {} (distance from input: {:.2})",
            self.end.coordinate, self.end.distance
        );
        let _ = writeln!(buffer);
        let _ = writeln!(buffer, "Route found ({} mode)", self.mode);
        let _ = writeln!(buffer, "  Number of segments: {}", metrics.num_segments);
        let _ = writeln!(buffer, "  Number of nodes traversed: {}", metrics.num_nodes);
        let _ = writeln!(buffer, "  Total length: {:.2}", metrics.total_length);
        let _ = writeln!(buffer, "  Average segment weight: {:.2}", metrics.avg_weight);
        let _ = writeln!(
            buffer,
            "  Total weighted desirability: {:.2}",
            metrics.total_weight
        );
        match metrics.total_cost {
            Some(total_cost) => {
                let _ = writeln!(buffer, "  Total cost: {total_cost:.2}");
            }
            None => {
                let _ = writeln!(buffer, "  Total cost: n/a (route uses excluded segments)");
            }
        }

        if !metrics.segments.is_empty() {
            let shown = metrics.segments.len().min(PREVIEW_SEGMENTS);
            let _ = writeln!(buffer);
            let _ = writeln!(buffer, "First {shown} segments:");
            for (i, segment) in metrics.segments.iter().take(PREVIEW_SEGMENTS).enumerate() {
                let _ = writeln!(
                    buffer,
                    "  {}. Length: {:.1}, Weight: {:.1}",
                    i + 1,
                    segment.length,
                    segment.weight
                );
            }
        }

        buffer
    }
}

/// One line per mode with total length and average weight.
pub fn render_mode_comparison(metrics: &[RouteMetrics]) -> String {
    let mut buffer = String::new();
    for entry in metrics {
        let _ = writeln!(
            buffer,
            "{:<15} {:.2} length, {:.2} avg weight",
            format!("{}:", entry.mode),
            entry.total_length,
            entry.avg_weight
        );
    }
    buffer
}
