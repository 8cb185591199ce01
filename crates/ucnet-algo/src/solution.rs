//! Commitment solution data structures

use serde::Serialize;
use ucnet_core::{PowerState, UcError, UcResult};

use crate::network::{NodeKey, UcNetwork};

/// Flow above this marks an arc as used.
pub const FLOW_THRESHOLD: f64 = 0.5;

/// Flow value of one arc
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcFlow {
    pub tail: NodeKey,
    pub head: NodeKey,
    /// Period of the tail node
    pub period: i32,
    pub flow: f64,
}

impl ArcFlow {
    pub fn is_active(&self) -> bool {
        self.flow > FLOW_THRESHOLD
    }
}

/// Commitment decision for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledPeriod {
    pub period: usize,
    pub state: PowerState,
    /// Economic dispatch cost of `state` in this period
    pub dispatch_cost: f64,
    /// Startup cost paid to enter `state`
    pub transition_cost: f64,
    /// Output per unit (MW)
    pub output_mw: Vec<f64>,
    /// Dispatch cost is the infeasibility penalty
    pub penalized: bool,
}

/// Size of the MILP handed to the solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub variables: usize,
    pub flow_constraints: usize,
    pub conflict_constraints: usize,
}

impl ModelStats {
    pub fn constraints(&self) -> usize {
        self.flow_constraints + self.conflict_constraints
    }
}

/// Optimal path through the network
#[derive(Debug, Clone, Serialize)]
pub struct CommitmentSolution {
    /// Total objective value (dispatch + startup cost)
    pub objective: f64,
    /// Flow value of every arc, in arc order
    pub flows: Vec<ArcFlow>,
    /// One entry per period along the source-sink path
    pub schedule: Vec<ScheduledPeriod>,
    pub stats: ModelStats,
    pub solve_time_ms: u128,
}

impl CommitmentSolution {
    pub fn active_arcs(&self) -> impl Iterator<Item = &ArcFlow> {
        self.flows.iter().filter(|f| f.is_active())
    }

    /// Committed state per period.
    pub fn states(&self) -> Vec<PowerState> {
        self.schedule.iter().map(|s| s.state).collect()
    }

    pub fn total_dispatch_cost(&self) -> f64 {
        self.schedule.iter().map(|s| s.dispatch_cost).sum()
    }

    pub fn total_startup_cost(&self) -> f64 {
        self.schedule.iter().map(|s| s.transition_cost).sum()
    }

    pub fn uses_penalty(&self) -> bool {
        self.schedule.iter().any(|s| s.penalized)
    }
}

/// Result of the commitment MILP
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SolveOutcome {
    Optimal(CommitmentSolution),
    /// No source-sink path satisfies the constraints
    Infeasible,
}

impl SolveOutcome {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }

    pub fn solution(&self) -> Option<&CommitmentSolution> {
        match self {
            SolveOutcome::Optimal(s) => Some(s),
            SolveOutcome::Infeasible => None,
        }
    }
}

/// Follow the active arcs from the source to the sink.
pub(crate) fn trace_schedule(network: &UcNetwork, flows: &[f64]) -> UcResult<Vec<ScheduledPeriod>> {
    let mut schedule = Vec::with_capacity(network.n_periods());
    let mut current = network.source();
    while current != network.sink() {
        let edge = network
            .outgoing(current)
            .find(|e| flows[e.index()] > FLOW_THRESHOLD)
            .ok_or_else(|| {
                UcError::invariant(format!(
                    "no active arc leaves {}",
                    network.node(current).key()
                ))
            })?;
        let (_, head_idx) = network
            .endpoints(edge)
            .ok_or_else(|| UcError::invariant("arc without endpoints"))?;
        let head = network.node(head_idx);
        if !head.is_sink() {
            let dispatch = head.dispatch().ok_or_else(|| {
                UcError::invariant(format!("node {} was never evaluated", head.key()))
            })?;
            schedule.push(ScheduledPeriod {
                period: schedule.len(),
                state: head.state(),
                dispatch_cost: dispatch.cost,
                transition_cost: network.arc(edge).transition_cost(),
                output_mw: dispatch.output_mw.clone(),
                penalized: dispatch.penalized,
            });
        }
        current = head_idx;
    }
    Ok(schedule)
}
