//! Output formats and text renderings for CLI reports.

use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;

use safemap_lib::{ConnectivityReport, SnappedEndpoint};

/// Output format for the `route` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RouteFormat {
    #[default]
    Text,
    Json,
    /// FeatureCollection of the traversed source segments.
    Geojson,
}

/// Output format for diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Troubleshooting hints printed when endpoints lie in different components.
pub const UNREACHABLE_HINTS: &str = "Troubleshooting:
  1. Verify your start/end points snap to nodes in the same connected component
  2. Check if your network has disconnected segments
  3. Run `safemap-cli analyze` to identify issues";

/// Summary of the connectivity report for JSON output.
#[derive(Debug, Serialize)]
pub struct ConnectivitySummary {
    pub component_count: usize,
    pub component_sizes: Vec<usize>,
    pub dead_ends: usize,
    pub intersections: usize,
}

impl From<&ConnectivityReport> for ConnectivitySummary {
    fn from(report: &ConnectivityReport) -> Self {
        Self {
            component_count: report.component_count(),
            component_sizes: report.component_sizes(),
            dead_ends: report.dead_ends.len(),
            intersections: report.intersections.len(),
        }
    }
}

pub fn render_connectivity(report: &ConnectivityReport) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "=== Graph Connectivity Analysis ===");
    let _ = writeln!(
        buffer,
        "Number of connected components: {}",
        report.component_count()
    );

    if report.component_count() > 1 {
        let _ = writeln!(buffer);
        let _ = writeln!(buffer, "Component sizes:");
        for (i, size) in report.component_sizes().iter().enumerate() {
            let _ = writeln!(buffer, "  Component {}: {} nodes", i + 1, size);
        }
    }

    let _ = writeln!(buffer);
    let _ = writeln!(
        buffer,
        "Dead-end nodes (degree 1): {}",
        report.dead_ends.len()
    );
    let _ = writeln!(
        buffer,
        "Intersection nodes (degree > 2): {}",
        report.intersections.len()
    );
    buffer
}

pub fn render_snapped(snapped: &SnappedEndpoint) -> String {
    format!(
        "Nearest node: {} {} (distance from input: {:.2})\n",
        snapped.node, snapped.coordinate, snapped.distance
    )
}
