//! Loaded network facade and the reloadable handle around it.
//!
//! A [`RouteNetwork`] bundles the source records, the graph built from them
//! and a spatial index over its nodes. It answers coordinate-to-coordinate
//! route queries. [`NetworkHandle`] lets a long-running process swap in a
//! freshly loaded network while queries already in flight finish against the
//! one they started with.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::connectivity::{analyze_connectivity, ConnectivityReport};
use crate::dataset::{load_records, FieldMapping, SegmentRecord};
use crate::error::{Endpoint, Error, Result};
use crate::geometry::Coordinate;
use crate::graph::{build_graph, Graph, GraphBuildOptions, NodeId};
use crate::routing::{extract_route, route, RouteMetrics, RouteMode, RoutePath};
use crate::spatial::{nearest_node, SpatialIndex};

/// Candidates fetched from the index so equidistant nodes resolve to the
/// lowest id. When every candidate ties, snapping falls back to a linear scan.
const SNAP_CANDIDATES: usize = 4;

/// A query coordinate and the node it snapped to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnappedEndpoint {
    pub query: Coordinate,
    pub node: NodeId,
    pub coordinate: Coordinate,
    pub distance: f64,
}

/// Everything a coordinate-to-coordinate route query produces.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    pub mode: RouteMode,
    pub start: SnappedEndpoint,
    pub end: SnappedEndpoint,
    pub path: RoutePath,
    /// Source record ordinals in traversal order.
    pub orig_indices: Vec<usize>,
    pub metrics: RouteMetrics,
}

/// An immutable, loaded network ready for queries.
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone)]
pub struct RouteNetwork {
    inner: Arc<NetworkInner>,
}

#[derive(Debug)]
struct NetworkInner {
    records: Vec<SegmentRecord>,
    graph: Graph,
    index: SpatialIndex,
}

impl RouteNetwork {
    /// Build the graph and spatial index over in-memory records.
    pub fn from_records(records: Vec<SegmentRecord>, options: &GraphBuildOptions) -> Result<Self> {
        let graph = build_graph(&records, options)?;
        let index = SpatialIndex::build(&graph);
        Ok(Self {
            inner: Arc::new(NetworkInner {
                records,
                graph,
                index,
            }),
        })
    }

    /// Load a GeoJSON dataset and build a network from it.
    pub fn load(
        path: &Path,
        mapping: &FieldMapping,
        options: &GraphBuildOptions,
    ) -> Result<Self> {
        let records = load_records(path, mapping)?;
        let network = Self::from_records(records, options)?;
        info!(
            path = %path.display(),
            nodes = network.graph().node_count(),
            edges = network.graph().edge_count(),
            "route network ready"
        );
        Ok(network)
    }

    /// Source records in input order.
    pub fn records(&self) -> &[SegmentRecord] {
        &self.inner.records
    }

    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.inner.index
    }

    /// Snap `point` to its nearest node; equidistant nodes resolve to the
    /// lowest id.
    pub fn snap(&self, point: Coordinate) -> Result<SnappedEndpoint> {
        let (nearest, distance) = self.inner.index.nearest(point)?;
        let tied: Vec<NodeId> = self
            .inner
            .index
            .nearest_n(point, SNAP_CANDIDATES)
            .into_iter()
            .filter(|(_, candidate)| *candidate <= distance)
            .map(|(node, _)| node)
            .collect();
        let (node, distance) = if tied.len() >= SNAP_CANDIDATES {
            nearest_node(self.graph(), point)?
        } else {
            (tied.into_iter().min().unwrap_or(nearest), distance)
        };
        let coordinate = self.inner.graph.coordinate(node).ok_or(Error::EmptyGraph)?;

        debug!(%point, %node, distance, "snapped coordinate to nearest node");
        Ok(SnappedEndpoint {
            query: point,
            node,
            coordinate,
            distance,
        })
    }

    /// Plan a route between the nodes nearest to `start` and `end`.
    pub fn plan_route(
        &self,
        start: Coordinate,
        end: Coordinate,
        mode: RouteMode,
    ) -> Result<RouteResult> {
        let start = self.snap(start).map_err(|err| tag_endpoint(err, Endpoint::Start))?;
        let end = self.snap(end).map_err(|err| tag_endpoint(err, Endpoint::End))?;

        let (path, metrics) = route(self.graph(), start.node, end.node, mode)?;
        let orig_indices = extract_route(&path, self.graph())?;

        Ok(RouteResult {
            mode,
            start,
            end,
            path,
            orig_indices,
            metrics,
        })
    }

    /// Connectivity diagnostics for the loaded graph.
    pub fn analyze_connectivity(&self) -> ConnectivityReport {
        analyze_connectivity(self.graph())
    }
}

fn tag_endpoint(err: Error, endpoint: Endpoint) -> Error {
    if let Error::InvalidCoordinate { input } = err {
        return Error::InvalidCoordinate {
            input: format!("{endpoint} {input}"),
        };
    }
    err
}

/// Shared, swappable reference to the current [`RouteNetwork`].
///
/// Readers take a snapshot with [`NetworkHandle::current`] and keep using it
/// for the whole query; a concurrent [`NetworkHandle::replace`] or
/// [`NetworkHandle::reload`] only affects later snapshots.
pub struct NetworkHandle {
    current: ArcSwap<RouteNetwork>,
}

impl NetworkHandle {
    pub fn new(network: RouteNetwork) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(network)),
        }
    }

    /// Snapshot of the network in use right now.
    pub fn current(&self) -> Arc<RouteNetwork> {
        self.current.load_full()
    }

    /// Install `network` and return the one it replaced.
    pub fn replace(&self, network: RouteNetwork) -> Arc<RouteNetwork> {
        self.current.swap(Arc::new(network))
    }

    /// Load a dataset from disk and install it.
    ///
    /// On failure the current network stays in place.
    pub fn reload(
        &self,
        path: &Path,
        mapping: &FieldMapping,
        options: &GraphBuildOptions,
    ) -> Result<Arc<RouteNetwork>> {
        match RouteNetwork::load(path, mapping, options) {
            Ok(network) => {
                info!(path = %path.display(), "reloaded route network");
                Ok(self.replace(network))
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "reload failed; keeping current network");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for NetworkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkHandle")
            .field("current", &self.current.load_full())
            .finish()
    }
}
