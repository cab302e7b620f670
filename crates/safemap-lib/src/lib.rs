//! Safemap library entry points.
//!
//! This crate loads a network of line segments carrying a length and a signed
//! desirability weight, builds an undirected routing graph from their
//! endpoints, snaps arbitrary coordinates onto that graph, and plans routes
//! under one of three optimization modes. Higher-level consumers (CLI, HTTP
//! front-ends) should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod connectivity;
pub mod cost;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod network;
pub mod output;
pub mod path;
pub mod routing;
pub mod spatial;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use connectivity::{analyze_connectivity, ConnectivityReport};
pub use cost::{DegenerateCostPolicy, DEFAULT_CLAMP_DIVISOR};
pub use dataset::{load_records, records_from_reader, FieldMapping, Geometry, SegmentRecord};
pub use error::{Endpoint, Error, Result};
pub use geometry::{parse_coordinate_pair, Coordinate};
pub use graph::{build_graph, Edge, EdgeId, Graph, GraphBuildOptions, NodeId};
pub use network::{NetworkHandle, RouteNetwork, RouteResult, SnappedEndpoint};
pub use output::{render_mode_comparison, route_feature_collection, RouteSummary};
pub use routing::{extract_route, route, RouteMetrics, RouteMode, RoutePath, SegmentDetail};
pub use spatial::{nearest_node, SpatialIndex};
