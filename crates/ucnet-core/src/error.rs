//! Unified error type for network construction and solving
//!
//! [`UcError`] covers every fallible step from loading a problem file to the
//! final MILP solve. Per-node dispatch infeasibility is deliberately absent
//! from the default path: it is absorbed as a penalty cost and only surfaces
//! as [`UcError::Dispatch`] when the `reject` policy is configured.
//!
//! # Example
//!
//! ```ignore
//! use ucnet_core::{UcError, UcResult};
//!
//! fn load(path: &str) -> UcResult<()> {
//!     let config = ProblemConfig::from_path(path)?;
//!     let (problem, _options) = config.into_problem()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Error type for all unit commitment operations.
#[derive(Error, Debug)]
pub enum UcError {
    /// I/O errors (problem file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Inconsistent problem data, detected before any construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// Contract violation inside enumeration, pattern algebra or graph wiring
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Dispatch sub-problem failure under the `reject` policy
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Solver/backend failures other than infeasibility
    #[error("Solver error: {0}")]
    Solver(String),

    /// Execution environment failures, e.g. worker threads that cannot start
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl UcError {
    pub fn config(msg: impl Into<String>) -> Self {
        UcError::Config(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        UcError::Invariant(msg.into())
    }
}

/// Convenience type alias for Results using UcError.
pub type UcResult<T> = Result<T, UcError>;

impl From<anyhow::Error> for UcError {
    fn from(err: anyhow::Error) -> Self {
        UcError::Solver(err.to_string())
    }
}

impl From<serde_json::Error> for UcError {
    fn from(err: serde_json::Error) -> Self {
        UcError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for UcError {
    fn from(err: toml::de::Error) -> Self {
        UcError::Parse(err.to_string())
    }
}
