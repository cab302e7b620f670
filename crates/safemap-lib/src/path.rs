use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::graph::{Edge, EdgeId, Graph, NodeId};

/// Result of a successful search: the node sequence, the edge taken between
/// each consecutive pair, and the summed edge cost.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub cost: f64,
}

/// Run Dijkstra's algorithm from `start` to `goal`.
///
/// Edges are priced by `edge_cost` as the search relaxes them, so only edges
/// reachable before the goal is settled are ever priced. A pricing error
/// aborts the search. Costs must be non-negative; an infinite cost marks an
/// edge the search never traverses. Every parallel edge is relaxed on its
/// own, so the cheapest of them wins.
///
/// Returns `Ok(None)` when no finite-cost route exists.
pub fn find_route_dijkstra<F>(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    mut edge_cost: F,
) -> Result<Option<SearchOutcome>>
where
    F: FnMut(&Edge) -> Result<f64>,
{
    if !graph.contains(start) || !graph.contains(goal) {
        return Ok(None);
    }
    if start == goal {
        return Ok(Some(SearchOutcome {
            nodes: vec![start],
            edges: Vec::new(),
            cost: 0.0,
        }));
    }

    let mut distances = vec![f64::INFINITY; graph.node_count()];
    let mut parents: Vec<Option<(NodeId, EdgeId)>> = vec![None; graph.node_count()];
    let mut queue = BinaryHeap::new();

    distances[start.index()] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = distances[entry.node.index()];
        if entry.cost.0 > current_distance {
            continue;
        }

        if entry.node == goal {
            let (nodes, edges) = reconstruct_path(&parents, start, goal);
            return Ok(Some(SearchOutcome {
                nodes,
                edges,
                cost: current_distance,
            }));
        }

        for (edge, next) in graph.neighbours(entry.node) {
            let cost = edge_cost(edge)?;
            if !cost.is_finite() {
                continue;
            }

            let next_cost = current_distance + cost;
            if next_cost < distances[next.index()] {
                distances[next.index()] = next_cost;
                parents[next.index()] = Some((entry.node, edge.id));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    Ok(None)
}

fn reconstruct_path(
    parents: &[Option<(NodeId, EdgeId)>],
    start: NodeId,
    goal: NodeId,
) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut nodes = vec![goal];
    let mut edges = Vec::new();
    let mut current = goal;
    while current != start {
        let Some((parent, edge)) = parents[current.index()] else {
            break;
        };
        edges.push(edge);
        nodes.push(parent);
        current = parent;
    }
    nodes.reverse();
    edges.reverse();
    (nodes, edges)
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
