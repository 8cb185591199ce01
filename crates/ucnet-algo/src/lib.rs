//! # ucnet-algo: Unit Commitment on a Time-Expanded Network
//!
//! The commitment problem is recast as a shortest path: one node per
//! feasible `(on/off state, period)` pair, arcs between consecutive periods
//! priced with dispatch plus startup cost, and minimum up/down times
//! enforced as pairwise arc conflicts in a binary MILP.
//!
//! ## Pipeline
//!
//! - [`network`] - Node enumeration, feasibility filter and arc wiring
//! - [`dispatch`] - Per-node economic dispatch (Clarabel QP or lambda iteration)
//! - [`costs`] - Startup and total arc costs
//! - [`conflicts`] - Temporal conflict sets from minimum up/down times
//! - [`formulation`] - good_lp MILP and solution extraction
//! - [`solver`] - [`CommitmentSolver`], running all of the above
//!
//! ## Example
//!
//! ```ignore
//! use ucnet_algo::CommitmentSolver;
//! use ucnet_core::ProblemConfig;
//!
//! let (problem, options) = ProblemConfig::from_path("problem.toml")?.into_problem()?;
//! let report = CommitmentSolver::new(options).solve(&problem)?;
//! if let Some(solution) = report.outcome.solution() {
//!     println!("objective = {}", solution.objective);
//! }
//! ```

pub mod conflicts;
pub mod costs;
pub mod dispatch;
pub mod formulation;
pub mod network;
pub mod parallel;
pub mod solution;
pub mod solver;

pub use conflicts::{ConflictSet, TemporalConflictGenerator};
pub use costs::ArcCostModel;
pub use dispatch::{
    ClarabelDispatch, DispatchBackend, DispatchEvaluator, DispatchPoint, DispatchProblem,
    DispatchResult, LambdaDispatch,
};
pub use formulation::CommitmentModelFormulator;
pub use network::{ArcKey, BuildStats, NetworkBuilder, NodeKey, NodeRole, UcArc, UcNetwork, UcNode};
pub use parallel::WorkerPool;
pub use solution::{ArcFlow, CommitmentSolution, ModelStats, ScheduledPeriod, SolveOutcome};
pub use solver::{CommitmentSolver, ReportSummary, SolveReport};
