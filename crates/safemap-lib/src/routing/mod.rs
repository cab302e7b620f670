//! Route planning over a built [`Graph`].
//!
//! This module provides:
//! - [`RouteMode`] - the three optimization criteria
//! - [`RoutePath`] - an ordered node sequence plus the edge used per step
//! - [`RouteMetrics`] - totals and per-segment details of a path
//! - [`route`] - the main entry point for node-to-node routing
//! - [`extract_route`] - mapping a path back to source record ordinals
//!
//! # Strategy Pattern
//!
//! Each mode is priced by its own [`RoutePlanner`]. The search asks the
//! planner for an edge's cost only when it relaxes that edge, so a segment
//! the degenerate cost policy rejects fails a query only if the query reaches
//! it. The graph itself is never written, so any number of queries may run
//! against one graph at once.

mod planner;

pub use planner::{
    select_planner, BalancedPlanner, DesirabilityPlanner, RoutePlanner, ShortestPlanner,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Endpoint, Error, Result};
use crate::geometry::Coordinate;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::path::find_route_dijkstra;

/// Optimization criterion for a route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Minimize plain length.
    Shortest,
    /// Minimize `100 * length / (1 + 2 * weight)`; strongly favours
    /// desirable segments.
    MostDesirable,
    /// Minimize the stored `length / (1 + weight)` cost.
    #[default]
    Balanced,
}

impl RouteMode {
    /// Every mode, in presentation order.
    pub const ALL: [RouteMode; 3] = [
        RouteMode::Balanced,
        RouteMode::Shortest,
        RouteMode::MostDesirable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Shortest => "shortest",
            RouteMode::MostDesirable => "most_desirable",
            RouteMode::Balanced => "balanced",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "shortest" => Ok(RouteMode::Shortest),
            "most_desirable" => Ok(RouteMode::MostDesirable),
            "balanced" => Ok(RouteMode::Balanced),
            _ => Err(Error::InvalidConfig {
                message: format!(
                    "unknown route mode '{value}'; expected shortest, most_desirable or balanced"
                ),
            }),
        }
    }
}

/// Ordered nodes of a route and the edge traversed between each pair.
///
/// A path always has at least one node and exactly one edge fewer than it
/// has nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePath {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl RoutePath {
    /// The zero-segment path that starts and ends at `node`.
    pub fn single(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            edges: Vec::new(),
        }
    }

    /// Assemble a path from explicit node and edge lists.
    ///
    /// Only the list shapes are checked here; [`extract_route`] checks the
    /// edges against a graph.
    pub fn from_parts(nodes: Vec<NodeId>, edges: Vec<EdgeId>) -> Result<Self> {
        if nodes.is_empty() || edges.len() + 1 != nodes.len() {
            return Err(Error::MalformedPath {
                nodes: nodes.len(),
                edges: edges.len(),
            });
        }
        Ok(Self { nodes, edges })
    }

    /// Rebuild the edge list for a bare node sequence.
    ///
    /// Between each consecutive pair the connecting edge with the lowest
    /// stored cost is chosen, the lowest source ordinal breaking ties.
    pub fn from_nodes(graph: &Graph, nodes: Vec<NodeId>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::MalformedPath { nodes: 0, edges: 0 });
        }

        let edges = nodes
            .windows(2)
            .enumerate()
            .map(|(position, pair)| {
                let (from, to) = (pair[0], pair[1]);
                graph
                    .edges_between(from, to)
                    .min_by(|a, b| {
                        a.cost
                            .total_cmp(&b.cost)
                            .then_with(|| a.orig_idx.cmp(&b.orig_idx))
                    })
                    .map(|edge| edge.id)
                    .ok_or(Error::BrokenPath { position, from, to })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nodes, edges })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn start(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn end(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of traversed segments.
    pub fn segment_count(&self) -> usize {
        self.edges.len()
    }

    /// `(from, to, edge)` for each step in traversal order.
    pub fn steps(&self) -> impl Iterator<Item = (NodeId, NodeId, EdgeId)> + '_ {
        self.nodes
            .windows(2)
            .zip(&self.edges)
            .map(|(pair, &edge)| (pair[0], pair[1], edge))
    }
}

/// One traversed segment, oriented in travel direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentDetail {
    pub from: Coordinate,
    pub to: Coordinate,
    pub length: f64,
    pub weight: f64,
    /// Stored balanced cost of the edge; `None` when the segment is
    /// excluded from balanced routing.
    pub cost: Option<f64>,
    pub orig_idx: usize,
}

/// Aggregate measurements of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMetrics {
    pub mode: RouteMode,
    pub total_length: f64,
    pub total_weight: f64,
    /// Sum of stored balanced costs, whatever the mode; `None` when any
    /// segment is excluded from balanced routing.
    pub total_cost: Option<f64>,
    /// Sum of the costs the mode minimized.
    pub objective: f64,
    /// `total_weight / num_segments`, or 0 for a zero-segment route.
    pub avg_weight: f64,
    pub num_segments: usize,
    pub num_nodes: usize,
    pub segments: Vec<SegmentDetail>,
}

impl RouteMetrics {
    /// Measure `path` on `graph` under `mode`.
    pub fn for_path(graph: &Graph, path: &RoutePath, mode: RouteMode) -> Result<Self> {
        let planner = select_planner(mode);
        let settings = graph.cost_settings();
        let mut objective = 0.0;
        for (position, (from, to, edge_id)) in path.steps().enumerate() {
            let edge = graph
                .edge(edge_id)
                .filter(|edge| edge.connects(from, to))
                .ok_or(Error::BrokenPath { position, from, to })?;
            objective += planner.price(edge, settings)?;
        }

        let mut metrics = Self::measure(graph, path, mode)?;
        metrics.objective = objective;
        Ok(metrics)
    }

    fn measure(graph: &Graph, path: &RoutePath, mode: RouteMode) -> Result<Self> {
        let mut segments = Vec::with_capacity(path.segment_count());
        for (position, (from, to, edge_id)) in path.steps().enumerate() {
            let broken = || Error::BrokenPath { position, from, to };
            let edge = graph
                .edge(edge_id)
                .filter(|edge| edge.connects(from, to))
                .ok_or_else(broken)?;
            let (Some(from_coordinate), Some(to_coordinate)) =
                (graph.coordinate(from), graph.coordinate(to))
            else {
                return Err(broken());
            };
            segments.push(SegmentDetail {
                from: from_coordinate,
                to: to_coordinate,
                length: edge.length,
                weight: edge.weight,
                cost: edge.balanced_cost(),
                orig_idx: edge.orig_idx,
            });
        }

        let total_length = segments.iter().map(|s| s.length).sum();
        let total_weight: f64 = segments.iter().map(|s| s.weight).sum();
        let total_cost = segments.iter().map(|s| s.cost).sum::<Option<f64>>();
        let avg_weight = if segments.is_empty() {
            0.0
        } else {
            total_weight / segments.len() as f64
        };

        Ok(Self {
            mode,
            total_length,
            total_weight,
            total_cost,
            objective: 0.0,
            avg_weight,
            num_segments: segments.len(),
            num_nodes: path.nodes().len(),
            segments,
        })
    }
}

/// Plan the best route between two graph nodes under `mode`.
///
/// Checks run in this order: both endpoints must be graph nodes and both
/// must share a component. A route from a node to itself is then returned
/// without pricing anything. Otherwise edges are priced as the search
/// reaches them, and the first one the degenerate cost policy rejects fails
/// the query. Equal-cost routes resolve by settling the lower node id first.
pub fn route(
    graph: &Graph,
    start: NodeId,
    end: NodeId,
    mode: RouteMode,
) -> Result<(RoutePath, RouteMetrics)> {
    if !graph.contains(start) {
        return Err(Error::UnknownNode {
            endpoint: Endpoint::Start,
            node: start,
        });
    }
    if !graph.contains(end) {
        return Err(Error::UnknownNode {
            endpoint: Endpoint::End,
            node: end,
        });
    }

    if let (Some(start_component), Some(end_component)) =
        (graph.component_of(start), graph.component_of(end))
    {
        if start_component != end_component {
            return Err(Error::Unreachable {
                start,
                end,
                start_component,
                end_component,
            });
        }
    }

    if start == end {
        let path = RoutePath::single(start);
        let metrics = RouteMetrics::measure(graph, &path, mode)?;
        return Ok((path, metrics));
    }

    let planner = select_planner(mode);
    let settings = graph.cost_settings();
    let outcome = find_route_dijkstra(graph, start, end, |edge| planner.price(edge, settings))?
        .ok_or(Error::RouteNotFound { start, end, mode })?;

    let path = RoutePath::from_parts(outcome.nodes, outcome.edges)?;
    let mut metrics = RouteMetrics::measure(graph, &path, mode)?;
    metrics.objective = outcome.cost;

    debug!(
        %mode,
        %start,
        %end,
        segments = metrics.num_segments,
        total_length = metrics.total_length,
        objective = metrics.objective,
        "planned route"
    );

    Ok((path, metrics))
}

/// Source record ordinals of the segments along `path`, in traversal order.
///
/// The position of an ordinal in the returned list is its `route_order`.
pub fn extract_route(path: &RoutePath, graph: &Graph) -> Result<Vec<usize>> {
    path.steps()
        .enumerate()
        .map(|(position, (from, to, edge_id))| {
            graph
                .edge(edge_id)
                .filter(|edge| edge.connects(from, to))
                .map(|edge| edge.orig_idx)
                .ok_or(Error::BrokenPath { position, from, to })
        })
        .collect()
}
