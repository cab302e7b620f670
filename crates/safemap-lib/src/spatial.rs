//! Nearest-node snapping.
//!
//! [`nearest_node`] is a plain linear scan over every node and is the
//! reference behaviour: it returns the node with the smallest Euclidean
//! distance and, among equidistant nodes, the one with the lowest id.
//!
//! [`SpatialIndex`] answers the same question in O(log n) average time using a
//! KD-tree (k=2). It is built once per graph and shared read-only. Among
//! equidistant nodes the index returns whichever the tree visits first, so
//! callers needing the stable tie-break should use the linear scan.

use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::Coordinate;
use crate::graph::{Graph, NodeId};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Find the graph node closest to `point` and its distance.
pub fn nearest_node(graph: &Graph, point: Coordinate) -> Result<(NodeId, f64)> {
    ensure_finite(point)?;

    let mut best: Option<(NodeId, f64)> = None;
    for node in graph.node_ids() {
        let Some(coordinate) = graph.coordinate(node) else {
            continue;
        };
        let distance = coordinate.distance_to(&point);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((node, distance)),
        }
    }

    let (node, distance) = best.ok_or(Error::EmptyGraph)?;
    debug!(%point, %node, distance, "snapped coordinate to nearest node");
    Ok((node, distance))
}

/// KD-tree over the node coordinates of one graph.
pub struct SpatialIndex {
    /// `None` when the coordinates cannot be bucketed (see [`SpatialIndex::build`]).
    tree: Option<KdTree<f64, usize, 2, BUCKET_SIZE, u32>>,
    nodes: Vec<(NodeId, Coordinate)>,
}

impl SpatialIndex {
    /// Build an index over every node of `graph`.
    ///
    /// The KD-tree cannot split a bucket whose items all share one axis
    /// value. If more than `BUCKET_SIZE - 1` nodes share an x or y value
    /// the tree is not built and queries fall back to a linear scan.
    pub fn build(graph: &Graph) -> Self {
        let nodes: Vec<(NodeId, Coordinate)> = graph
            .node_ids()
            .filter_map(|node| graph.coordinate(node).map(|c| (node, c)))
            .collect();

        let densest_axis = max_shared_axis_value(&nodes);
        let tree = if densest_axis >= BUCKET_SIZE {
            warn!(
                nodes_on_one_axis = densest_axis,
                "too many nodes share one axis value for the KD-tree; using linear scan"
            );
            None
        } else {
            let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
            for (index, (_, coordinate)) in nodes.iter().enumerate() {
                tree.add(&[coordinate.x, coordinate.y], index);
            }
            Some(tree)
        };

        info!(
            node_count = nodes.len(),
            kd_tree = tree.is_some(),
            "built spatial index"
        );

        Self { tree, nodes }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest node to `point` and its distance.
    pub fn nearest(&self, point: Coordinate) -> Result<(NodeId, f64)> {
        ensure_finite(point)?;
        self.nearest_n(point, 1)
            .into_iter()
            .next()
            .ok_or(Error::EmptyGraph)
    }

    /// Up to `k` nearest nodes, sorted by ascending distance.
    pub fn nearest_n(&self, point: Coordinate, k: usize) -> Vec<(NodeId, f64)> {
        if k == 0 || self.nodes.is_empty() || !point.is_finite() {
            return Vec::new();
        }

        match &self.tree {
            Some(tree) => tree
                .nearest_n::<SquaredEuclidean>(&[point.x, point.y], k)
                .into_iter()
                .map(|neighbour| (self.nodes[neighbour.item].0, neighbour.distance.sqrt()))
                .collect(),
            None => {
                let mut all: Vec<(NodeId, f64)> = self
                    .nodes
                    .iter()
                    .map(|(node, coordinate)| (*node, coordinate.distance_to(&point)))
                    .collect();
                all.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                all.truncate(k);
                all
            }
        }
    }

    /// Whether queries go through the KD-tree.
    pub fn uses_tree(&self) -> bool {
        self.tree.is_some()
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("node_count", &self.nodes.len())
            .field("kd_tree", &self.tree.is_some())
            .finish()
    }
}

fn ensure_finite(point: Coordinate) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            input: point.to_string(),
        })
    }
}

/// Largest number of nodes sharing a single x or a single y value.
fn max_shared_axis_value(nodes: &[(NodeId, Coordinate)]) -> usize {
    let mut xs: HashMap<u64, usize> = HashMap::new();
    let mut ys: HashMap<u64, usize> = HashMap::new();
    for (_, coordinate) in nodes {
        *xs.entry(coordinate.x.to_bits()).or_default() += 1;
        *ys.entry(coordinate.y.to_bits()).or_default() += 1;
    }
    xs.values().chain(ys.values()).copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, GraphBuildOptions};
    use crate::test_helpers::line;

    fn diagonal_graph() -> Graph {
        let records = vec![line((0.0, 0.0), (10.0, 10.0), 14.0, 0.0)];
        build_graph(&records, &GraphBuildOptions::default()).unwrap()
    }

    #[test]
    fn linear_scan_finds_closest_node() {
        let graph = diagonal_graph();
        let (node, distance) = nearest_node(&graph, Coordinate::new(1.0, 1.0)).unwrap();
        assert_eq!(graph.coordinate(node), Some(Coordinate::new(0.0, 0.0)));
        assert!((distance - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn exact_hit_has_zero_distance() {
        let graph = diagonal_graph();
        let (node, distance) = nearest_node(&graph, Coordinate::new(10.0, 10.0)).unwrap();
        assert_eq!(graph.coordinate(node), Some(Coordinate::new(10.0, 10.0)));
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn ties_resolve_to_lowest_node_id() {
        let graph = diagonal_graph();
        let (node, _) = nearest_node(&graph, Coordinate::new(5.0, 5.0)).unwrap();
        assert_eq!(node, NodeId(0));
    }

    #[test]
    fn empty_graph_is_an_error() {
        let err = nearest_node(&Graph::default(), Coordinate::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::EmptyGraph));

        let index = SpatialIndex::build(&Graph::default());
        assert!(index.is_empty());
        assert!(matches!(
            index.nearest(Coordinate::new(0.0, 0.0)),
            Err(Error::EmptyGraph)
        ));
    }

    #[test]
    fn non_finite_query_is_rejected() {
        let graph = diagonal_graph();
        let err = nearest_node(&graph, Coordinate::new(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate { .. }));
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                let x = i as f64 * 1.5;
                let y = (i * 7 % 11) as f64;
                line((x, y), (x + 0.7, y + 0.3), 1.0, 0.0)
            })
            .collect();
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        let index = SpatialIndex::build(&graph);
        assert!(index.uses_tree());
        assert_eq!(index.len(), graph.node_count());

        for query in [(0.1, 0.2), (13.3, 4.4), (28.0, 9.9), (-5.0, -5.0), (7.7, 2.1)] {
            let query = Coordinate::from(query);
            let (linear_node, linear_distance) = nearest_node(&graph, query).unwrap();
            let (indexed_node, indexed_distance) = index.nearest(query).unwrap();
            assert!((linear_distance - indexed_distance).abs() < 1e-9);
            assert_eq!(linear_node, indexed_node);
        }
    }

    #[test]
    fn nearest_n_is_sorted_by_distance() {
        let graph = diagonal_graph();
        let index = SpatialIndex::build(&graph);
        let hits = index.nearest_n(Coordinate::new(9.0, 9.0), 5);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].1 <= hits[1].1);
        assert_eq!(graph.coordinate(hits[0].0), Some(Coordinate::new(10.0, 10.0)));
    }

    #[test]
    fn crowded_axis_falls_back_to_linear_scan() {
        // A long north-south street: every node shares x = 0.
        let records: Vec<_> = (0..BUCKET_SIZE)
            .map(|i| line((0.0, i as f64), (0.0, i as f64 + 1.0), 1.0, 0.0))
            .collect();
        let graph = build_graph(&records, &GraphBuildOptions::default()).unwrap();
        let index = SpatialIndex::build(&graph);
        assert!(!index.uses_tree());

        let (node, distance) = index.nearest(Coordinate::new(0.2, 4.1)).unwrap();
        assert_eq!(graph.coordinate(node), Some(Coordinate::new(0.0, 4.0)));
        assert!((distance - (0.2f64.powi(2) + 0.1f64.powi(2)).sqrt()).abs() < 1e-9);
    }
}
