use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::connectivity::label_components;
use crate::cost::{
    balanced_cost, balanced_divisor, desirability_cost, CostSettings, DegenerateCostPolicy,
    DEFAULT_CLAMP_DIVISOR,
};
use crate::dataset::{Geometry, SegmentRecord};
use crate::error::{Error, Result};
use crate::geometry::{Coordinate, NodeKey, MAX_NODE_COORDINATE};
use crate::routing::RouteMode;

/// Dense node identifier, assigned in the order endpoints are first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Dense edge identifier; one edge per routed source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {}", self.0)
    }
}

/// Undirected edge built from one line record.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Source length measurement.
    pub length: f64,
    /// Sum of the two desirability components.
    pub weight: f64,
    /// `length / (1 + weight)`, resolved through the build's cost policy.
    /// Infinite when the policy excludes the segment from balanced routing;
    /// see [`Edge::balanced_cost`].
    pub cost: f64,
    /// Ordinal of the originating record in the input collection.
    pub orig_idx: usize,
    /// Full line geometry of the originating record.
    #[serde(skip)]
    pub geometry: Vec<Coordinate>,
}

impl Edge {
    /// The endpoint across the edge from `node`, if `node` is an endpoint.
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Whether the edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The stored balanced cost, or `None` for an excluded segment.
    pub fn balanced_cost(&self) -> Option<f64> {
        self.cost.is_finite().then_some(self.cost)
    }
}

/// Options controlling graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphBuildOptions {
    /// Handling of segments whose weight breaks a cost divisor.
    pub cost_policy: DegenerateCostPolicy,
    /// Divisor used by [`DegenerateCostPolicy::Clamp`].
    pub clamp_divisor: f64,
    /// Also check the `most_desirable` cost of every segment at build time.
    /// Under [`DegenerateCostPolicy::Reject`] this fails the build instead of
    /// the first query that reaches the segment.
    pub strict_costs: bool,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            cost_policy: DegenerateCostPolicy::default(),
            clamp_divisor: DEFAULT_CLAMP_DIVISOR,
            strict_costs: false,
        }
    }
}

impl GraphBuildOptions {
    fn cost_settings(&self) -> Result<CostSettings> {
        if !(self.clamp_divisor.is_finite() && self.clamp_divisor > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "clamp divisor must be a positive finite number, got {}",
                    self.clamp_divisor
                ),
            });
        }
        Ok(CostSettings {
            policy: self.cost_policy,
            clamp_divisor: self.clamp_divisor,
        })
    }
}

/// Immutable undirected routing graph.
///
/// Cloning is cheap: all data sits behind an `Arc`, so one built graph can be
/// shared by any number of concurrent queries. Parallel edges between the
/// same pair of nodes are kept as distinct edges.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: Arc<GraphInner>,
}

#[derive(Debug)]
struct GraphInner {
    nodes: Vec<NodeKey>,
    node_index: HashMap<NodeKey, NodeId>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeId>>,
    components: Vec<usize>,
    component_count: usize,
    skipped_records: usize,
    cost_settings: CostSettings,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edges.len()
    }

    /// Number of connected components, computed once at build time.
    pub fn component_count(&self) -> usize {
        self.inner.component_count
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    /// Records that were not lines and therefore produced no edge.
    pub fn skipped_records(&self) -> usize {
        self.inner.skipped_records
    }

    /// Cost settings the graph was built with.
    pub fn cost_settings(&self) -> &CostSettings {
        &self.inner.cost_settings
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.inner.nodes.len()
    }

    /// All node identifiers in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.inner.nodes.len()).map(NodeId)
    }

    /// Rounded coordinate identifying `node`.
    pub fn coordinate(&self, node: NodeId) -> Option<Coordinate> {
        self.inner.nodes.get(node.index()).map(NodeKey::coordinate)
    }

    /// Node whose identity matches `coordinate` after rounding.
    pub fn node_at(&self, coordinate: Coordinate) -> Option<NodeId> {
        self.inner.node_index.get(&coordinate.node_key()).copied()
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.inner.edges.get(edge.index())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.inner.edges
    }

    /// Edges incident to `node`. A self-loop appears twice.
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.inner
            .adjacency
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(edge, neighbour)` pairs reachable in one step from `node`.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (&Edge, NodeId)> + '_ {
        self.incident_edges(node).iter().filter_map(move |&id| {
            let edge = &self.inner.edges[id.index()];
            edge.opposite(node).map(|next| (edge, next))
        })
    }

    /// Number of incident edge ends (parallel edges count individually, a
    /// self-loop counts twice).
    pub fn degree(&self, node: NodeId) -> usize {
        self.incident_edges(node).len()
    }

    /// Component id of `node`; ids follow each component's lowest node id.
    pub fn component_of(&self, node: NodeId) -> Option<usize> {
        self.inner.components.get(node.index()).copied()
    }

    /// Every edge joining `a` and `b`.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incident_edges(a)
            .iter()
            .map(move |&id| &self.inner.edges[id.index()])
            .filter(move |edge| edge.connects(a, b))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            inner: Arc::new(GraphInner {
                nodes: Vec::new(),
                node_index: HashMap::new(),
                edges: Vec::new(),
                adjacency: Vec::new(),
                components: Vec::new(),
                component_count: 0,
                skipped_records: 0,
                cost_settings: CostSettings::default(),
            }),
        }
    }
}

/// Build the routing graph from an ordered collection of segment records.
///
/// Each line record contributes one edge between the nodes identified by its
/// rounded first and last coordinates. Records with any other geometry are
/// skipped with a warning. The records themselves are only borrowed.
pub fn build_graph(records: &[SegmentRecord], options: &GraphBuildOptions) -> Result<Graph> {
    let cost_settings = options.cost_settings()?;

    let mut nodes: Vec<NodeKey> = Vec::new();
    let mut node_index: HashMap<NodeKey, NodeId> = HashMap::new();
    let mut adjacency: Vec<Vec<EdgeId>> = Vec::new();
    let mut edges: Vec<Edge> = Vec::with_capacity(records.len());
    let mut skipped_records = 0usize;
    let mut degenerate = 0usize;

    let mut intern = |key: NodeKey, adjacency: &mut Vec<Vec<EdgeId>>| -> NodeId {
        *node_index.entry(key).or_insert_with(|| {
            nodes.push(key);
            adjacency.push(Vec::new());
            NodeId(nodes.len() - 1)
        })
    };

    for (orig_idx, record) in records.iter().enumerate() {
        let Some((first, last)) = record.geometry.line_endpoints() else {
            warn!(
                orig_idx,
                geometry = record.geometry.kind(),
                "skipping record without a line geometry"
            );
            skipped_records += 1;
            continue;
        };

        validate_record(orig_idx, record)?;

        let weight = record.weight();
        let cost = balanced_cost(record.length, weight, &cost_settings).ok_or(
            Error::DegenerateCost {
                orig_idx,
                weight,
                mode: RouteMode::Balanced,
            },
        )?;
        if balanced_divisor(weight) <= 0.0 {
            degenerate += 1;
        }
        if options.strict_costs
            && desirability_cost(record.length, weight, &cost_settings).is_none()
        {
            return Err(Error::DegenerateCost {
                orig_idx,
                weight,
                mode: RouteMode::MostDesirable,
            });
        }

        let source = intern(first.node_key(), &mut adjacency);
        let target = intern(last.node_key(), &mut adjacency);
        let id = EdgeId(edges.len());

        adjacency[source.index()].push(id);
        adjacency[target.index()].push(id);

        let geometry = match &record.geometry {
            Geometry::LineString(coords) => coords.clone(),
            Geometry::Other { .. } => Vec::new(),
        };

        edges.push(Edge {
            id,
            source,
            target,
            length: record.length,
            weight,
            cost,
            orig_idx,
            geometry,
        });
    }

    if degenerate > 0 {
        warn!(
            segments = degenerate,
            policy = %cost_settings.policy,
            "segments with weight <= -1 were resolved by the degenerate cost policy"
        );
    }

    let (components, component_count) = label_components(nodes.len(), &edges, &adjacency);

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        components = component_count,
        skipped = skipped_records,
        "built routing graph"
    );

    if component_count > 1 {
        let mut sizes = vec![0usize; component_count];
        for &component in &components {
            sizes[component] += 1;
        }
        warn!(
            components = component_count,
            largest = sizes.iter().copied().max().unwrap_or(0),
            "graph has separate components; routes between them will fail"
        );
    }

    Ok(Graph {
        inner: Arc::new(GraphInner {
            nodes,
            node_index,
            edges,
            adjacency,
            components,
            component_count,
            skipped_records,
            cost_settings,
        }),
    })
}

fn validate_record(orig_idx: usize, record: &SegmentRecord) -> Result<()> {
    let invalid = |message: String| Error::InvalidRecord { orig_idx, message };

    if let Geometry::LineString(coords) = &record.geometry {
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(invalid("line has non-finite coordinates".to_string()));
        }
        if let Some(c) = coords.iter().find(|c| !c.fits_node_key()) {
            return Err(invalid(format!(
                "coordinate {c} exceeds the supported magnitude of {MAX_NODE_COORDINATE:e}"
            )));
        }
    }
    if !record.length.is_finite() || record.length < 0.0 {
        return Err(invalid(format!(
            "length must be finite and non-negative, got {}",
            record.length
        )));
    }
    if !record.primary_weight.is_finite() || !record.secondary_weight.is_finite() {
        return Err(invalid(format!(
            "weights must be finite, got {} and {}",
            record.primary_weight, record.secondary_weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{line, triangle_records};

    #[test]
    fn builds_one_node_per_distinct_endpoint() {
        let graph = build_graph(&triangle_records(2.0), &GraphBuildOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.component_count(), 1);
        assert_eq!(graph.skipped_records(), 0);
    }

    #[test]
    fn rounding_merges_near_duplicate_endpoints() {
        let records = vec![
            line((0.0, 0.0), (1.0, 0.0), 1.0, 0.0),
            line((1.000_000_2, -0.000_000_3), (2.0, 0.0), 1.0, 0.0),
        ];
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        assert_eq!(graph.node_count(), 3);
        let shared = graph.node_at(Coordinate::new(1.0, 0.0)).unwrap();
        assert_eq!(graph.degree(shared), 2);
    }

    #[test]
    fn edges_carry_attributes_and_back_references() {
        let records = vec![
            SegmentRecord {
                geometry: Geometry::Other {
                    kind: "Point".to_string(),
                },
                ..line((0.0, 0.0), (0.0, 0.0), 0.0, 0.0)
            },
            SegmentRecord::line(
                vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(0.5, 0.5),
                    Coordinate::new(1.0, 0.0),
                ],
                0.5,
                0.25,
                14.0,
            ),
        ];
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        assert_eq!(graph.skipped_records(), 1);
        assert_eq!(graph.edge_count(), 1);

        let edge = &graph.edges()[0];
        assert_eq!(edge.orig_idx, 1);
        assert_eq!(edge.length, 14.0);
        assert_eq!(edge.weight, 0.75);
        assert_eq!(edge.cost, 14.0 / 1.75);
        assert_eq!(edge.geometry.len(), 3);
        assert_eq!(graph.coordinate(edge.target), Some(Coordinate::new(1.0, 0.0)));
    }

    #[test]
    fn cost_matches_formula_for_valid_weights() {
        let records: Vec<_> = [-0.9, -0.5, 0.0, 0.3, 4.0]
            .iter()
            .enumerate()
            .map(|(i, &w)| line((i as f64, 0.0), (i as f64 + 1.0, 0.0), 7.0, w))
            .collect();
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        for edge in graph.edges() {
            assert_eq!(edge.cost, edge.length / (1.0 + edge.weight));
        }
    }

    #[test]
    fn parallel_edges_and_self_loops_are_kept() {
        let records = vec![
            line((0.0, 0.0), (1.0, 0.0), 5.0, 0.0),
            line((1.0, 0.0), (0.0, 0.0), 3.0, 0.0),
            line((1.0, 0.0), (1.0, 0.0), 2.0, 0.0),
        ];
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        let a = graph.node_at(Coordinate::new(0.0, 0.0)).unwrap();
        let b = graph.node_at(Coordinate::new(1.0, 0.0)).unwrap();

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edges_between(a, b).count(), 2);
        assert_eq!(graph.degree(a), 2);
        // Two parallel edges plus both ends of the loop.
        assert_eq!(graph.degree(b), 4);
        assert!(graph.edges()[2].is_self_loop());
    }

    #[test]
    fn degenerate_weight_is_rejected_by_default() {
        let err = build_graph(&triangle_records(-2.0), &GraphBuildOptions::default()).unwrap_err();
        match err {
            Error::DegenerateCost {
                orig_idx,
                weight,
                mode,
            } => {
                assert_eq!(orig_idx, 1);
                assert_eq!(weight, -2.0);
                assert_eq!(mode, RouteMode::Balanced);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn weight_of_exactly_minus_one_is_degenerate() {
        let records = vec![line((0.0, 0.0), (1.0, 0.0), 5.0, -1.0)];
        assert!(matches!(
            build_graph(&records, &GraphBuildOptions::default()),
            Err(Error::DegenerateCost { .. })
        ));
    }

    #[test]
    fn clamp_and_exclude_policies_resolve_degenerate_weights() {
        let clamp = GraphBuildOptions {
            cost_policy: DegenerateCostPolicy::Clamp,
            clamp_divisor: 0.5,
            ..GraphBuildOptions::default()
        };
        let graph = build_graph(&triangle_records(-2.0), &clamp).unwrap();
        assert_eq!(graph.edges()[1].cost, 20.0);

        let exclude = GraphBuildOptions {
            cost_policy: DegenerateCostPolicy::Exclude,
            ..GraphBuildOptions::default()
        };
        let graph = build_graph(&triangle_records(-2.0), &exclude).unwrap();
        assert!(graph.edges()[1].cost.is_infinite());
        assert_eq!(graph.edges()[1].balanced_cost(), None);
        assert_eq!(graph.edges()[0].balanced_cost(), Some(10.0));
    }

    #[test]
    fn invalid_clamp_divisor_is_a_config_error() {
        let options = GraphBuildOptions {
            cost_policy: DegenerateCostPolicy::Clamp,
            clamp_divisor: 0.0,
            ..GraphBuildOptions::default()
        };
        assert!(matches!(
            build_graph(&[], &options),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn invalid_records_are_reported() {
        let negative = vec![line((0.0, 0.0), (1.0, 0.0), -1.0, 0.0)];
        assert!(matches!(
            build_graph(&negative, &GraphBuildOptions::default()),
            Err(Error::InvalidRecord { orig_idx: 0, .. })
        ));

        let non_finite = vec![
            line((0.0, 0.0), (1.0, 0.0), 1.0, 0.0),
            line((0.0, 0.0), (f64::NAN, 0.0), 1.0, 0.0),
        ];
        assert!(matches!(
            build_graph(&non_finite, &GraphBuildOptions::default()),
            Err(Error::InvalidRecord { orig_idx: 1, .. })
        ));
    }

    #[test]
    fn coordinates_beyond_node_key_range_are_rejected() {
        let records = vec![
            line((0.0, 0.0), (1.0e13, 0.0), 1.0, 0.0),
            line((0.0, 0.0), (2.0e13, 0.0), 1.0, 0.0),
        ];
        assert!(matches!(
            build_graph(&records, &GraphBuildOptions::default()),
            Err(Error::InvalidRecord { orig_idx: 0, .. })
        ));
    }

    #[test]
    fn strict_costs_are_off_by_default() {
        let graph = build_graph(&triangle_records(-0.6), &GraphBuildOptions::default()).unwrap();
        assert_eq!(graph.edge_count(), 3);

        let strict_clamp = GraphBuildOptions {
            cost_policy: DegenerateCostPolicy::Clamp,
            strict_costs: true,
            ..GraphBuildOptions::default()
        };
        assert!(build_graph(&triangle_records(-0.6), &strict_clamp).is_ok());
    }

    #[test]
    fn input_records_are_left_untouched() {
        let records = triangle_records(2.0);
        let before = records.clone();
        let _ = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = build_graph(&[], &GraphBuildOptions::default()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.component_count(), 0);
        assert!(Graph::default().is_empty());
    }
}
