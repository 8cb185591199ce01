//! # ucnet-core: Unit Commitment Network Data Model
//!
//! Fundamental types for the time-expanded network formulation of the unit
//! commitment problem.
//!
//! ## Core Data Structures
//!
//! - [`UnitSpec`] - Power limits, quadratic cost curve, minimum up/down time
//!   and startup cost of one generating unit
//! - [`DemandProfile`] - Demand per discrete period
//! - [`PowerState`] - Fixed-width on/off vector, identified by its bit-string
//! - [`Pattern`] - Three-valued `{0, 1, x}` pattern used to derive temporal
//!   conflicts between state transitions
//! - [`UcProblem`] - A validated instance (fleet + demand + initial status)
//!
//! ## Modules
//!
//! - [`combinations`] - Enumeration of all on/off combinations and bit-string
//!   conversions
//! - [`config`] - Problem files (TOML/JSON) and [`NetworkOptions`]
//! - [`error`] - [`UcError`] and [`UcResult`]

pub mod combinations;
pub mod config;
pub mod error;
pub mod pattern;
pub mod problem;
pub mod state;
pub mod unit;

pub use config::{
    ConflictHorizon, DispatchBackendKind, EvaluationMode, InfeasiblePolicy, NetworkOptions,
    ProblemConfig, DEFAULT_PENALTY_COST,
};
pub use error::{UcError, UcResult};
pub use pattern::{Pattern, Trit};
pub use problem::{DemandProfile, UcProblem};
pub use state::PowerState;
pub use unit::UnitSpec;
