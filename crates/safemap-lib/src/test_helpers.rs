// Test-only helpers for `safemap-lib` unit tests
#![allow(dead_code)]

use crate::dataset::SegmentRecord;
use crate::geometry::Coordinate;
use crate::graph::{build_graph, Graph, GraphBuildOptions, NodeId};

/// Straight two-point line record whose weight sits entirely in the primary
/// component.
pub fn line(from: (f64, f64), to: (f64, f64), length: f64, weight: f64) -> SegmentRecord {
    SegmentRecord::line(vec![from.into(), to.into()], weight, 0.0, length)
}

/// A(0,0)-B(10,0) length 10 weight 0, B-C(10,10) length 10 weight `bc_weight`,
/// A-C length 30 weight 0. Record ordinals 0, 1, 2 in that order.
pub fn triangle_records(bc_weight: f64) -> Vec<SegmentRecord> {
    vec![
        line((0.0, 0.0), (10.0, 0.0), 10.0, 0.0),
        line((10.0, 0.0), (10.0, 10.0), 10.0, bc_weight),
        line((0.0, 0.0), (10.0, 10.0), 30.0, 0.0),
    ]
}

/// Triangle graph plus the A, B, C node ids.
pub fn triangle_graph(bc_weight: f64, options: &GraphBuildOptions) -> (Graph, [NodeId; 3]) {
    let graph = build_graph(&triangle_records(bc_weight), options).expect("triangle builds");
    let node = |x, y| graph.node_at(Coordinate::new(x, y)).expect("triangle node");
    let ids = [node(0.0, 0.0), node(10.0, 0.0), node(10.0, 10.0)];
    (graph, ids)
}
