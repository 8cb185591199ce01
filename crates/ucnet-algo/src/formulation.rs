//! Shortest-path MILP over the commitment network.
//!
//! ```text
//! minimize    Σ_a total_cost(a) · x_a
//! subject to  Σ_out x − Σ_in x = +1 (source), −1 (sink), 0 (otherwise)
//!             Σ_{f ∈ F(a)} x_f + M_a · x_a ≤ M_a      for every conflict set
//!             x_a ∈ {0, 1}
//! ```
//!
//! The conflict rows are the big-M form of "if `x_a = 1` then no arc of
//! `F(a)` carries flow", with `M_a` the number of periods `F(a)` spans.

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{debug, info, warn};
use ucnet_core::{UcError, UcResult};
use web_time::Instant;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as milp_solver;
#[cfg(all(feature = "solver-microlp", not(feature = "solver-highs")))]
use good_lp::solvers::microlp::microlp as milp_solver;

#[cfg(not(any(feature = "solver-microlp", feature = "solver-highs")))]
compile_error!("enable one of the `solver-microlp` or `solver-highs` features");

use crate::conflicts::ConflictSet;
use crate::network::UcNetwork;
use crate::solution::{trace_schedule, ArcFlow, CommitmentSolution, ModelStats, SolveOutcome};

pub struct CommitmentModelFormulator<'a> {
    network: &'a UcNetwork,
    conflicts: &'a [ConflictSet],
}

impl<'a> CommitmentModelFormulator<'a> {
    pub fn new(network: &'a UcNetwork, conflicts: &'a [ConflictSet]) -> Self {
        Self { network, conflicts }
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            variables: self.network.arc_count(),
            flow_constraints: self.network.node_count(),
            conflict_constraints: self.conflicts.len(),
        }
    }

    /// Solve the MILP. Every arc must already be priced.
    pub fn solve(&self) -> UcResult<SolveOutcome> {
        let network = self.network;
        let stats = self.stats();

        if network.has_empty_period() {
            warn!("a period has no feasible state; the model has no source-sink path");
            return Ok(SolveOutcome::Infeasible);
        }

        let start = Instant::now();
        let mut vars = ProblemVariables::new();
        let x: Vec<Variable> = network
            .arcs()
            .map(|_| vars.add(variable().integer().min(0.0).max(1.0)))
            .collect();

        let mut costs = Vec::with_capacity(x.len());
        let mut objective = Expression::from(0.0);
        for edge in network.arcs() {
            let arc = network.arc(edge);
            let cost = arc.total_cost().ok_or_else(|| {
                UcError::invariant(format!("arc {} has no total cost", arc.key()))
            })?;
            objective += cost * x[edge.index()];
            costs.push(cost);
        }

        let mut model = vars.minimise(objective).using(milp_solver);

        // Flow conservation
        for idx in network.graph().node_indices() {
            let node = network.node(idx);
            let mut flow_out = Expression::from(0.0);
            for e in network.outgoing(idx) {
                flow_out += x[e.index()];
            }
            let mut flow_in = Expression::from(0.0);
            for e in network.incoming(idx) {
                flow_in += x[e.index()];
            }
            let balance = node.demand_balance() as f64;
            model = model.with(constraint!(flow_out - flow_in == balance));
        }

        // Temporal conflicts
        for set in self.conflicts {
            let big_m = set.big_m();
            let mut forbidden = Expression::from(0.0);
            for e in &set.forbidden {
                forbidden += x[e.index()];
            }
            let trigger = x[set.trigger.index()];
            model = model.with(constraint!(forbidden + big_m * trigger <= big_m));
        }

        debug!(
            variables = stats.variables,
            constraints = stats.constraints(),
            "commitment model built"
        );

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                warn!("commitment model is infeasible");
                return Ok(SolveOutcome::Infeasible);
            }
            Err(e) => return Err(UcError::Solver(format!("{:?}", e))),
        };

        let values: Vec<f64> = x.iter().map(|&v| solution.value(v)).collect();
        let objective: f64 = costs.iter().zip(&values).map(|(c, v)| c * v).sum();
        let flows = network
            .arcs()
            .map(|edge| {
                let arc = network.arc(edge);
                ArcFlow {
                    tail: arc.tail(),
                    head: arc.head(),
                    period: arc.tail().period,
                    flow: values[edge.index()],
                }
            })
            .collect();
        let schedule = trace_schedule(network, &values)?;
        let solve_time_ms = start.elapsed().as_millis();

        info!(
            "Commitment model solved: objective {:.4} in {} ms",
            objective, solve_time_ms
        );

        Ok(SolveOutcome::Optimal(CommitmentSolution {
            objective,
            flows,
            schedule,
            stats,
            solve_time_ms,
        }))
    }
}
