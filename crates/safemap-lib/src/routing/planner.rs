//! Route cost strategies implementing the Strategy pattern.
//!
//! Each [`RouteMode`] maps to one [`RoutePlanner`] that knows how to price an
//! edge. The orchestrator in the parent module hands the selected planner to
//! the search kernel, which prices edges as it relaxes them, so adding a
//! mode never touches the graph or the search itself.

use crate::cost::{desirability_cost, CostSettings};
use crate::error::{Error, Result};
use crate::graph::Edge;

use super::RouteMode;

/// Trait for per-mode edge pricing.
pub trait RoutePlanner: Send + Sync {
    /// The mode this planner prices edges for.
    fn mode(&self) -> RouteMode;

    /// Cost of traversing `edge`, or `None` when the degenerate cost policy
    /// rejects it. Infinite costs mark impassable edges.
    fn edge_cost(&self, edge: &Edge, settings: &CostSettings) -> Option<f64>;

    /// Cost of `edge` with a rejected edge turned into
    /// [`Error::DegenerateCost`].
    fn price(&self, edge: &Edge, settings: &CostSettings) -> Result<f64> {
        self.edge_cost(edge, settings)
            .ok_or(Error::DegenerateCost {
                orig_idx: edge.orig_idx,
                weight: edge.weight,
                mode: self.mode(),
            })
    }
}

/// Plain length; ignores desirability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPlanner;

impl RoutePlanner for ShortestPlanner {
    fn mode(&self) -> RouteMode {
        RouteMode::Shortest
    }

    fn edge_cost(&self, edge: &Edge, _settings: &CostSettings) -> Option<f64> {
        Some(edge.length)
    }
}

/// The cost stored on each edge at build time, `length / (1 + weight)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedPlanner;

impl RoutePlanner for BalancedPlanner {
    fn mode(&self) -> RouteMode {
        RouteMode::Balanced
    }

    fn edge_cost(&self, edge: &Edge, _settings: &CostSettings) -> Option<f64> {
        Some(edge.cost)
    }
}

/// `100 * length / (1 + 2 * weight)`, computed per query.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesirabilityPlanner;

impl RoutePlanner for DesirabilityPlanner {
    fn mode(&self) -> RouteMode {
        RouteMode::MostDesirable
    }

    fn edge_cost(&self, edge: &Edge, settings: &CostSettings) -> Option<f64> {
        desirability_cost(edge.length, edge.weight, settings)
    }
}

/// Select the planner for a mode.
pub fn select_planner(mode: RouteMode) -> Box<dyn RoutePlanner> {
    match mode {
        RouteMode::Shortest => Box::new(ShortestPlanner),
        RouteMode::MostDesirable => Box::new(DesirabilityPlanner),
        RouteMode::Balanced => Box::new(BalancedPlanner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::DegenerateCostPolicy;
    use crate::graph::{Graph, GraphBuildOptions};
    use crate::test_helpers::triangle_graph;

    #[test]
    fn select_planner_matches_mode() {
        for mode in RouteMode::ALL {
            assert_eq!(select_planner(mode).mode(), mode);
        }
    }

    fn prices(planner: &dyn RoutePlanner, graph: &Graph) -> Vec<Result<f64>> {
        graph
            .edges()
            .iter()
            .map(|edge| planner.price(edge, graph.cost_settings()))
            .collect()
    }

    #[test]
    fn prices_follow_each_formula() {
        let (graph, _) = triangle_graph(2.0, &GraphBuildOptions::default());
        let collect = |planner: &dyn RoutePlanner| -> Vec<f64> {
            prices(planner, &graph).into_iter().map(Result::unwrap).collect()
        };

        assert_eq!(collect(&ShortestPlanner), vec![10.0, 10.0, 30.0]);
        assert_eq!(collect(&BalancedPlanner), vec![10.0, 10.0 / 3.0, 30.0]);
        assert_eq!(collect(&DesirabilityPlanner), vec![1000.0, 200.0, 3000.0]);
    }

    #[test]
    fn rejecting_policy_refuses_only_the_degenerate_edge() {
        // -0.6 is fine for balanced (divisor 0.4) but not for most desirable.
        let (graph, _) = triangle_graph(-0.6, &GraphBuildOptions::default());
        assert!(prices(&BalancedPlanner, &graph).iter().all(Result::is_ok));

        let desirable = prices(&DesirabilityPlanner, &graph);
        assert!(desirable[0].is_ok());
        assert!(desirable[2].is_ok());
        match &desirable[1] {
            Err(Error::DegenerateCost {
                orig_idx,
                weight,
                mode,
            }) => {
                assert_eq!(*orig_idx, 1);
                assert_eq!(*weight, -0.6);
                assert_eq!(*mode, RouteMode::MostDesirable);
            }
            other => panic!("unexpected price: {other:?}"),
        }
    }

    #[test]
    fn excluding_policy_marks_edge_impassable() {
        let options = GraphBuildOptions {
            cost_policy: DegenerateCostPolicy::Exclude,
            ..GraphBuildOptions::default()
        };
        let (graph, _) = triangle_graph(-0.6, &options);
        let desirable = prices(&DesirabilityPlanner, &graph);
        assert!(desirable[1].as_ref().unwrap().is_infinite());
        assert!(desirable[0].as_ref().unwrap().is_finite());
    }
}
