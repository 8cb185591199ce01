//! Problem files and network construction options.
//!
//! A problem file lists the fleet as column vectors, one entry per unit, and
//! may carry a `[network]` table with construction options. Unspecified
//! options use their defaults.
//!
//! ```toml
//! n_units = 2
//! n_periods = 3
//! demand = [60.0, 90.0, 40.0]
//! p_min = [10.0, 20.0]
//! p_max = [50.0, 80.0]
//! c0 = [100.0, 80.0]
//! c1 = [20.0, 25.0]
//! c2 = [0.01, 0.02]
//! min_up_time = [2, 1]
//! min_down_time = [2, 1]
//! startup_cost = [300.0, 150.0]
//! initial_status = "10"
//!
//! [network]
//! prune_infeasible = true
//! dispatch_backend = "clarabel"
//! workers = 4
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combinations::MAX_UNITS;
use crate::{DemandProfile, PowerState, UcError, UcProblem, UcResult, UnitSpec};

/// Dispatch cost assigned to nodes whose sub-problem is infeasible.
pub const DEFAULT_PENALTY_COST: f64 = 1e9;

/// Raw problem file contents, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub n_units: usize,
    pub n_periods: usize,
    pub demand: Vec<f64>,
    pub p_min: Vec<f64>,
    pub p_max: Vec<f64>,
    pub c0: Vec<f64>,
    pub c1: Vec<f64>,
    pub c2: Vec<f64>,
    pub min_up_time: Vec<usize>,
    pub min_down_time: Vec<usize>,
    pub startup_cost: Vec<f64>,
    pub initial_status: String,
    #[serde(default)]
    pub network: NetworkOptions,
}

impl ProblemConfig {
    /// Load from a `.json` file, or TOML for any other extension.
    pub fn from_path(path: impl AsRef<Path>) -> UcResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn from_toml_str(text: &str) -> UcResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> UcResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check consistency and build the validated problem.
    pub fn into_problem(self) -> UcResult<(UcProblem, NetworkOptions)> {
        let n = self.n_units;
        if n > MAX_UNITS {
            return Err(UcError::config(format!(
                "n_units = {n} exceeds the enumerable limit of {MAX_UNITS}"
            )));
        }
        let columns = [
            ("p_min", self.p_min.len()),
            ("p_max", self.p_max.len()),
            ("c0", self.c0.len()),
            ("c1", self.c1.len()),
            ("c2", self.c2.len()),
            ("min_up_time", self.min_up_time.len()),
            ("min_down_time", self.min_down_time.len()),
            ("startup_cost", self.startup_cost.len()),
        ];
        if let Some((name, len)) = columns.iter().find(|(_, len)| *len != n) {
            return Err(UcError::config(format!(
                "{name} has {len} entries, expected n_units = {n}"
            )));
        }
        if self.demand.len() != self.n_periods {
            return Err(UcError::config(format!(
                "demand has {} entries, expected n_periods = {}",
                self.demand.len(),
                self.n_periods
            )));
        }
        if self.initial_status.len() != n {
            return Err(UcError::config(format!(
                "initial_status '{}' has {} positions, expected n_units = {n}",
                self.initial_status,
                self.initial_status.len()
            )));
        }
        let initial_status: PowerState = self
            .initial_status
            .parse()
            .map_err(|e| UcError::config(format!("initial_status: {e}")))?;
        self.network.validate()?;

        let units = (0..n)
            .map(|i| UnitSpec {
                index: i,
                p_min: self.p_min[i],
                p_max: self.p_max[i],
                c0: self.c0[i],
                c1: self.c1[i],
                c2: self.c2[i],
                min_up_time: self.min_up_time[i],
                min_down_time: self.min_down_time[i],
                startup_cost: self.startup_cost[i],
            })
            .collect();

        let problem = UcProblem::new(units, DemandProfile::new(self.demand), initial_status)?;
        Ok((problem, self.network))
    }
}

/// Options controlling network construction and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Drop interior nodes that cannot meet demand before wiring arcs.
    pub prune_infeasible: bool,

    /// Solver used for per-node economic dispatch.
    pub dispatch_backend: DispatchBackendKind,

    /// When node dispatch costs are computed.
    pub evaluation: EvaluationMode,

    /// Worker threads for partitioned phases (0 = one per CPU, 1 = serial).
    pub workers: usize,

    /// What to do when a node's dispatch sub-problem is infeasible.
    pub infeasible_policy: InfeasiblePolicy,

    /// Cost substituted under [`InfeasiblePolicy::Penalty`].
    pub penalty_cost: f64,

    /// Extent of the forbidden window after a unit switches.
    pub conflict_horizon: ConflictHorizon,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            prune_infeasible: true,
            dispatch_backend: DispatchBackendKind::default(),
            evaluation: EvaluationMode::default(),
            workers: 0,
            infeasible_policy: InfeasiblePolicy::default(),
            penalty_cost: DEFAULT_PENALTY_COST,
            conflict_horizon: ConflictHorizon::default(),
        }
    }
}

impl NetworkOptions {
    pub fn validate(&self) -> UcResult<()> {
        if !self.penalty_cost.is_finite() || self.penalty_cost <= 0.0 {
            return Err(UcError::config(format!(
                "penalty_cost must be a positive finite value, got {}",
                self.penalty_cost
            )));
        }
        Ok(())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune_infeasible = prune;
        self
    }

    pub fn with_dispatch_backend(mut self, backend: DispatchBackendKind) -> Self {
        self.dispatch_backend = backend;
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationMode) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn with_infeasible_policy(mut self, policy: InfeasiblePolicy) -> Self {
        self.infeasible_policy = policy;
        self
    }

    pub fn with_conflict_horizon(mut self, horizon: ConflictHorizon) -> Self {
        self.conflict_horizon = horizon;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchBackendKind {
    /// Interior-point QP via clarabel
    #[default]
    Clarabel,
    /// Equal incremental cost (lambda iteration)
    Lambda,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Evaluate every node up front, partitioned across workers
    #[default]
    Eager,
    /// Evaluate a node the first time an outgoing arc needs its cost
    Lazy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfeasiblePolicy {
    /// Substitute the penalty cost and log a warning
    #[default]
    Penalty,
    /// Abort construction with [`UcError::Dispatch`]
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictHorizon {
    /// Periods `head+1 .. min(head+w-1, n-1)` (half-open)
    #[default]
    Truncated,
    /// Periods `head+1 .. min(head+w, n)` (half-open)
    Full,
}

impl fmt::Display for DispatchBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchBackendKind::Clarabel => write!(f, "clarabel"),
            DispatchBackendKind::Lambda => write!(f, "lambda"),
        }
    }
}

impl FromStr for DispatchBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clarabel" | "qp" => Ok(DispatchBackendKind::Clarabel),
            "lambda" => Ok(DispatchBackendKind::Lambda),
            _ => Err(format!("Unknown dispatch backend: {}", s)),
        }
    }
}

impl fmt::Display for ConflictHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictHorizon::Truncated => write!(f, "truncated"),
            ConflictHorizon::Full => write!(f, "full"),
        }
    }
}

impl FromStr for ConflictHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truncated" => Ok(ConflictHorizon::Truncated),
            "full" => Ok(ConflictHorizon::Full),
            _ => Err(format!("Unknown conflict horizon: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_UNITS: &str = r#"
n_units = 2
n_periods = 3
demand = [60.0, 90.0, 40.0]
p_min = [10.0, 20.0]
p_max = [50.0, 80.0]
c0 = [100.0, 80.0]
c1 = [20.0, 25.0]
c2 = [0.01, 0.02]
min_up_time = [2, 1]
min_down_time = [2, 1]
startup_cost = [300.0, 150.0]
initial_status = "10"
"#;

    #[test]
    fn test_toml_without_network_table_uses_defaults() {
        let config = ProblemConfig::from_toml_str(TWO_UNITS).unwrap();
        let (problem, options) = config.into_problem().unwrap();
        assert_eq!(problem.n_units(), 2);
        assert_eq!(problem.n_periods(), 3);
        assert_eq!(problem.initial_status().to_string(), "10");
        assert_eq!(options, NetworkOptions::default());
    }

    #[test]
    fn test_network_table_overrides() {
        let text = format!(
            "{TWO_UNITS}\n[network]\nprune_infeasible = false\ndispatch_backend = \"lambda\"\nevaluation = \"lazy\"\nconflict_horizon = \"full\"\nworkers = 2\n"
        );
        let (_, options) = ProblemConfig::from_toml_str(&text)
            .unwrap()
            .into_problem()
            .unwrap();
        assert!(!options.prune_infeasible);
        assert_eq!(options.dispatch_backend, DispatchBackendKind::Lambda);
        assert_eq!(options.evaluation, EvaluationMode::Lazy);
        assert_eq!(options.conflict_horizon, ConflictHorizon::Full);
        assert_eq!(options.workers, 2);
        assert_eq!(options.penalty_cost, DEFAULT_PENALTY_COST);
    }

    #[test]
    fn test_mismatched_column_is_config_error() {
        let text = TWO_UNITS.replace("c1 = [20.0, 25.0]", "c1 = [20.0]");
        let err = ProblemConfig::from_toml_str(&text)
            .unwrap()
            .into_problem()
            .unwrap_err();
        assert!(matches!(err, UcError::Config(_)));
        assert!(err.to_string().contains("c1"));
    }

    #[test]
    fn test_unequal_min_times_fail_fast() {
        let text = TWO_UNITS.replace("min_down_time = [2, 1]", "min_down_time = [3, 1]");
        let err = ProblemConfig::from_toml_str(&text)
            .unwrap()
            .into_problem()
            .unwrap_err();
        assert!(matches!(err, UcError::Config(_)));
    }

    #[test]
    fn test_demand_length_mismatch() {
        let text = TWO_UNITS.replace("n_periods = 3", "n_periods = 4");
        assert!(ProblemConfig::from_toml_str(&text)
            .unwrap()
            .into_problem()
            .is_err());
    }

    #[test]
    fn test_json_file_by_extension() {
        let config = ProblemConfig::from_toml_str(TWO_UNITS).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.json");
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = ProblemConfig::from_path(&path).unwrap();
        assert_eq!(loaded.demand, vec![60.0, 90.0, 40.0]);
        assert_eq!(loaded.initial_status, "10");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let err = ProblemConfig::from_toml_str("n_units = [").unwrap_err();
        assert!(matches!(err, UcError::Parse(_)));
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!(
            "Lambda".parse::<DispatchBackendKind>().unwrap(),
            DispatchBackendKind::Lambda
        );
        assert_eq!(
            "full".parse::<ConflictHorizon>().unwrap(),
            ConflictHorizon::Full
        );
        assert!("simplex".parse::<DispatchBackendKind>().is_err());
    }

    fn load_error(text: &str) -> UcError {
        ProblemConfig::from_toml_str(text)
            .unwrap()
            .into_problem()
            .unwrap_err()
    }

    #[test]
    fn test_initial_status_with_unknown_symbol() {
        let text = TWO_UNITS.replace("initial_status = \"10\"", "initial_status = \"1x\"");
        let err = load_error(&text);
        assert!(matches!(err, UcError::Config(_)), "{err}");
        assert!(err.to_string().contains("initial_status"));
    }

    #[test]
    fn test_initial_status_too_short() {
        let text = TWO_UNITS.replace("initial_status = \"10\"", "initial_status = \"1\"");
        let err = load_error(&text);
        assert!(matches!(err, UcError::Config(_)), "{err}");
        assert!(err.to_string().contains("n_units = 2"));
    }

    #[test]
    fn test_fleet_above_enumerable_limit() {
        let n = MAX_UNITS + 1;
        let column = |v: &str| format!("[{}]", vec![v; n].join(", "));
        let text = format!(
            "n_units = {n}\nn_periods = 1\ndemand = [10.0]\np_min = {}\np_max = {}\nc0 = {}\nc1 = {}\nc2 = {}\nmin_up_time = {}\nmin_down_time = {}\nstartup_cost = {}\ninitial_status = \"{}\"\n",
            column("0.0"),
            column("10.0"),
            column("0.0"),
            column("1.0"),
            column("0.0"),
            column("1"),
            column("1"),
            column("0.0"),
            "0".repeat(n),
        );
        let err = load_error(&text);
        assert!(matches!(err, UcError::Config(_)), "{err}");
        assert!(err.to_string().contains("enumerable limit"));
    }
}
