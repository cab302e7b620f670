//! Connected components, dead ends and intersections.
//!
//! Component ids are assigned by scanning nodes in ascending id order, so
//! component `0` always contains node `0` and ids are stable for a given
//! input. The graph caches the per-node labels at build time; the report
//! here materialises the full membership lists for diagnostics.

use std::collections::VecDeque;

use serde::Serialize;

use crate::graph::{Edge, EdgeId, Graph, NodeId};

/// Connectivity diagnostics for a built graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    /// Component `i` lists the sorted node ids carrying component id `i`.
    pub components: Vec<Vec<NodeId>>,
    /// Nodes with exactly one incident edge end.
    pub dead_ends: Vec<NodeId>,
    /// Nodes with more than two incident edge ends.
    pub intersections: Vec<NodeId>,
}

impl ConnectivityReport {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }

    /// Component sizes, largest first.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.components.iter().map(Vec::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    /// The component with the most nodes (the lowest id wins a tie).
    pub fn largest_component(&self) -> Option<&[NodeId]> {
        self.components
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then_with(|| ib.cmp(ia)))
            .map(|(_, nodes)| nodes.as_slice())
    }
}

/// Compute components, dead ends and intersections of `graph`.
pub fn analyze_connectivity(graph: &Graph) -> ConnectivityReport {
    let mut components: Vec<Vec<NodeId>> = vec![Vec::new(); graph.component_count()];
    let mut dead_ends = Vec::new();
    let mut intersections = Vec::new();

    for node in graph.node_ids() {
        if let Some(component) = graph.component_of(node) {
            components[component].push(node);
        }
        match graph.degree(node) {
            1 => dead_ends.push(node),
            d if d > 2 => intersections.push(node),
            _ => {}
        }
    }

    tracing::debug!(
        components = components.len(),
        dead_ends = dead_ends.len(),
        intersections = intersections.len(),
        "analyzed graph connectivity"
    );

    ConnectivityReport {
        components,
        dead_ends,
        intersections,
    }
}

/// Label every node with its component id via breadth-first search.
///
/// Returns the per-node labels and the number of components.
pub(crate) fn label_components(
    node_count: usize,
    edges: &[Edge],
    adjacency: &[Vec<EdgeId>],
) -> (Vec<usize>, usize) {
    const UNLABELLED: usize = usize::MAX;

    let mut labels = vec![UNLABELLED; node_count];
    let mut count = 0usize;
    let mut queue = VecDeque::new();

    for root in 0..node_count {
        if labels[root] != UNLABELLED {
            continue;
        }
        labels[root] = count;
        queue.push_back(NodeId(root));

        while let Some(current) = queue.pop_front() {
            for edge in &adjacency[current.index()] {
                let Some(next) = edges[edge.index()].opposite(current) else {
                    continue;
                };
                if labels[next.index()] == UNLABELLED {
                    labels[next.index()] = count;
                    queue.push_back(next);
                }
            }
        }
        count += 1;
    }

    (labels, count)
}
