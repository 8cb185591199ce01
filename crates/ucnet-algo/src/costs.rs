//! Arc pricing: startup costs and dispatch-plus-transition totals.

use ucnet_core::{PowerState, UcProblem, UcResult};

use crate::dispatch::DispatchEvaluator;
use crate::network::{NodeKey, UcArc, UcNode};

/// Prices arcs from the fleet's startup costs.
#[derive(Debug, Clone)]
pub struct ArcCostModel {
    startup_cost: Vec<f64>,
}

impl ArcCostModel {
    pub fn new(problem: &UcProblem) -> Self {
        Self {
            startup_cost: problem.units().iter().map(|u| u.startup_cost).collect(),
        }
    }

    /// Sum of startup costs of the units that go from off in `from` to on in
    /// `to`. Shutdowns are free.
    pub fn startup_cost(&self, from: &PowerState, to: &PowerState) -> f64 {
        from.started_units(to).map(|i| self.startup_cost[i]).sum()
    }

    /// Transition cost of the arc `tail -> head`; zero into the sink.
    pub fn transition_cost(&self, tail: &NodeKey, head: &UcNode) -> f64 {
        if head.is_sink() {
            0.0
        } else {
            self.startup_cost(&tail.state, &head.state())
        }
    }

    /// Tail dispatch cost plus transition cost, stored on the arc.
    ///
    /// Triggers the tail's dispatch evaluation if it has not run yet.
    pub fn total_cost(
        &self,
        arc: &UcArc,
        tail: &UcNode,
        evaluator: &DispatchEvaluator<'_>,
    ) -> UcResult<f64> {
        if let Some(cost) = arc.total_cost() {
            return Ok(cost);
        }
        let dispatch = tail.ensure_dispatch(evaluator)?;
        Ok(arc.set_total_cost(dispatch.cost + arc.transition_cost()))
    }
}
