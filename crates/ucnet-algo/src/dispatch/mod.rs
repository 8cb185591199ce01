//! Per-node economic dispatch.
//!
//! For a node `(state, t)` the dispatch sub-problem is
//!
//! ```text
//! minimize    Σ_{i on} c0_i + c1_i·p_i + c2_i·p_i²
//! subject to  Σ p_i = demand[t]
//!             p_min_i ≤ p_i ≤ p_max_i   for every online unit i
//! ```
//!
//! Backends implement [`DispatchBackend`]; [`DispatchEvaluator`] wraps one
//! with the problem data and the infeasibility policy.

mod qp;
mod lambda;

pub use self::qp::ClarabelDispatch;
pub use self::lambda::LambdaDispatch;

use serde::Serialize;
use tracing::{debug, warn};
use ucnet_core::{
    DispatchBackendKind, InfeasiblePolicy, NetworkOptions, UcError, UcProblem, UcResult, UnitSpec,
};

use crate::network::UcNode;

/// Demand at or below this is treated as zero when no unit is online.
pub(crate) const DEMAND_EPSILON: f64 = 1e-6;

/// One dispatch sub-problem restricted to the online units.
#[derive(Debug, Clone)]
pub struct DispatchProblem<'a> {
    pub units: Vec<&'a UnitSpec>,
    pub demand: f64,
}

impl<'a> DispatchProblem<'a> {
    pub fn new(units: Vec<&'a UnitSpec>, demand: f64) -> Self {
        Self { units, demand }
    }

    pub fn p_min_sum(&self) -> f64 {
        self.units.iter().map(|u| u.p_min).sum()
    }

    pub fn p_max_sum(&self) -> f64 {
        self.units.iter().map(|u| u.p_max).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.p_min_sum() <= self.demand && self.demand <= self.p_max_sum()
    }

    /// Total production cost of a candidate output vector.
    pub fn cost_of(&self, output: &[f64]) -> f64 {
        self.units
            .iter()
            .zip(output)
            .map(|(u, &p)| u.cost_at(p))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    /// Minimum cost and the output of each online unit, in unit order.
    Optimal { cost: f64, output_mw: Vec<f64> },
    Infeasible,
}

/// Solves a single dispatch sub-problem.
pub trait DispatchBackend: Send + Sync {
    /// Short identifier used in logs (e.g. "clarabel", "lambda").
    fn id(&self) -> &str;

    fn solve(&self, problem: &DispatchProblem<'_>) -> UcResult<DispatchResult>;
}

pub fn backend_for(kind: DispatchBackendKind) -> Box<dyn DispatchBackend> {
    match kind {
        DispatchBackendKind::Clarabel => Box::new(ClarabelDispatch::default()),
        DispatchBackendKind::Lambda => Box::new(LambdaDispatch::default()),
    }
}

/// Memoized result stored on a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPoint {
    pub cost: f64,
    /// Output per unit of the full fleet; offline units are 0.
    pub output_mw: Vec<f64>,
    /// The cost is the infeasibility penalty, not a real dispatch.
    pub penalized: bool,
}

impl DispatchPoint {
    fn zero(n_units: usize) -> Self {
        Self {
            cost: 0.0,
            output_mw: vec![0.0; n_units],
            penalized: false,
        }
    }
}

/// Evaluates node dispatch costs against one problem instance.
pub struct DispatchEvaluator<'a> {
    problem: &'a UcProblem,
    backend: Box<dyn DispatchBackend>,
    policy: InfeasiblePolicy,
    penalty_cost: f64,
}

impl<'a> DispatchEvaluator<'a> {
    pub fn new(problem: &'a UcProblem, options: &NetworkOptions) -> Self {
        Self::with_backend(problem, backend_for(options.dispatch_backend), options)
    }

    pub fn with_backend(
        problem: &'a UcProblem,
        backend: Box<dyn DispatchBackend>,
        options: &NetworkOptions,
    ) -> Self {
        Self {
            problem,
            backend,
            policy: options.infeasible_policy,
            penalty_cost: options.penalty_cost,
        }
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Dispatch point of `node`, without memoization.
    ///
    /// The source costs nothing and never reaches the backend. Calling this on
    /// the sink is a contract violation.
    pub fn evaluate(&self, node: &UcNode) -> UcResult<DispatchPoint> {
        let n_units = self.problem.n_units();
        if node.is_source() {
            return Ok(DispatchPoint::zero(n_units));
        }
        if node.is_sink() {
            return Err(UcError::invariant(format!(
                "dispatch requested for sink node {}",
                node.key()
            )));
        }

        let period = usize::try_from(node.period())
            .map_err(|_| UcError::invariant(format!("node {} has no period", node.key())))?;
        let state = node.state();
        let active: Vec<usize> = state.active_units().collect();
        let demand = self.problem.demand().at(period);

        if active.is_empty() {
            return if demand <= DEMAND_EPSILON {
                Ok(DispatchPoint::zero(n_units))
            } else {
                self.infeasible(node, "no unit online".to_string())
            };
        }

        let units = self.problem.units();
        let sub = DispatchProblem::new(active.iter().map(|&i| &units[i]).collect(), demand);
        match self.backend.solve(&sub) {
            Ok(DispatchResult::Optimal { cost, output_mw }) => {
                let mut full = vec![0.0; n_units];
                for (&i, p) in active.iter().zip(output_mw) {
                    full[i] = p;
                }
                debug!(node = %node.key(), cost, backend = self.backend.id(), "dispatch solved");
                Ok(DispatchPoint {
                    cost,
                    output_mw: full,
                    penalized: false,
                })
            }
            Ok(DispatchResult::Infeasible) => self.infeasible(
                node,
                format!(
                    "demand {demand} outside [{}, {}]",
                    sub.p_min_sum(),
                    sub.p_max_sum()
                ),
            ),
            Err(err) => self.infeasible(node, err.to_string()),
        }
    }

    fn infeasible(&self, node: &UcNode, reason: String) -> UcResult<DispatchPoint> {
        match self.policy {
            InfeasiblePolicy::Penalty => {
                warn!(
                    node = %node.key(),
                    penalty = self.penalty_cost,
                    "dispatch infeasible ({reason}), using penalty cost"
                );
                Ok(DispatchPoint {
                    cost: self.penalty_cost,
                    output_mw: vec![0.0; self.problem.n_units()],
                    penalized: true,
                })
            }
            InfeasiblePolicy::Reject => Err(UcError::Dispatch(format!(
                "node {}: {reason}",
                node.key()
            ))),
        }
    }
}
