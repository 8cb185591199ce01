//! End-to-end commitment pipeline.
//!
//! 1. validate options
//! 2. build and price the network ([`NetworkBuilder`])
//! 3. derive temporal conflicts ([`TemporalConflictGenerator`])
//! 4. solve the shortest-path MILP ([`CommitmentModelFormulator`])

use serde::Serialize;
use tracing::info;
use ucnet_core::{NetworkOptions, UcProblem, UcResult};
use web_time::Instant;

use crate::conflicts::{ConflictSet, TemporalConflictGenerator};
use crate::dispatch::DispatchEvaluator;
use crate::formulation::CommitmentModelFormulator;
use crate::network::{BuildStats, NetworkBuilder, UcNetwork};
use crate::parallel::WorkerPool;
use crate::solution::SolveOutcome;

#[derive(Debug, Clone, Default)]
pub struct CommitmentSolver {
    options: NetworkOptions,
}

/// Everything produced by one run.
pub struct SolveReport {
    pub network: UcNetwork,
    pub build: BuildStats,
    pub conflicts: Vec<ConflictSet>,
    pub outcome: SolveOutcome,
    pub total_time_ms: u128,
}

/// Serializable summary of a [`SolveReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary<'a> {
    pub build: &'a BuildStats,
    pub conflict_sets: usize,
    pub outcome: &'a SolveOutcome,
    pub total_time_ms: u128,
}

impl SolveReport {
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            build: &self.build,
            conflict_sets: self.conflicts.len(),
            outcome: &self.outcome,
            total_time_ms: self.total_time_ms,
        }
    }
}

impl CommitmentSolver {
    pub fn new(options: NetworkOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    /// Build the network only, with every arc priced.
    pub fn build_network(&self, problem: &UcProblem) -> UcResult<(UcNetwork, BuildStats)> {
        self.options.validate()?;
        let pool = WorkerPool::new(self.options.workers)?;
        let evaluator = DispatchEvaluator::new(problem, &self.options);
        NetworkBuilder::new(problem, &self.options).build(&evaluator, &pool)
    }

    pub fn solve(&self, problem: &UcProblem) -> UcResult<SolveReport> {
        let start = Instant::now();
        self.options.validate()?;
        let pool = WorkerPool::new(self.options.workers)?;
        info!(
            units = problem.n_units(),
            periods = problem.n_periods(),
            workers = pool.workers(),
            backend = %self.options.dispatch_backend,
            "solving unit commitment"
        );

        let evaluator = DispatchEvaluator::new(problem, &self.options);
        let (network, build) = NetworkBuilder::new(problem, &self.options).build(&evaluator, &pool)?;

        let conflicts = TemporalConflictGenerator::new(problem, self.options.conflict_horizon)
            .generate(&network, &pool)?;

        let outcome = CommitmentModelFormulator::new(&network, &conflicts).solve()?;

        Ok(SolveReport {
            network,
            build,
            conflicts,
            outcome,
            total_time_ms: start.elapsed().as_millis(),
        })
    }
}
