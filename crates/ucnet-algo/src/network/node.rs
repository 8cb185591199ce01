//! Nodes of the time-expanded network.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use ucnet_core::{PowerState, UcError, UcResult};

use crate::dispatch::{DispatchEvaluator, DispatchPoint};

/// Period of the synthetic source node.
pub const SOURCE_PERIOD: i32 = -1;

/// Value identifier of a node: the fleet state in a given period.
///
/// Interior periods are `0..n_periods`; the source sits at `-1` and the sink
/// at `n_periods`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub state: PowerState,
    pub period: i32,
}

impl NodeKey {
    pub fn new(state: PowerState, period: i32) -> Self {
        Self { state, period }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', {})", self.state, self.period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeRole {
    Source,
    Interior,
    Sink,
}

/// A `(state, period)` vertex.
///
/// The dispatch point is memoized the first time it is requested and never
/// changes afterwards. The sink never has one.
#[derive(Debug)]
pub struct UcNode {
    key: NodeKey,
    role: NodeRole,
    dispatch: OnceLock<DispatchPoint>,
}

impl UcNode {
    pub fn source(initial_status: PowerState) -> Self {
        Self::new(NodeKey::new(initial_status, SOURCE_PERIOD), NodeRole::Source)
    }

    pub fn interior(state: PowerState, period: usize) -> Self {
        Self::new(NodeKey::new(state, period as i32), NodeRole::Interior)
    }

    pub fn sink(state: PowerState, n_periods: usize) -> Self {
        Self::new(NodeKey::new(state, n_periods as i32), NodeRole::Sink)
    }

    fn new(key: NodeKey, role: NodeRole) -> Self {
        Self {
            key,
            role,
            dispatch: OnceLock::new(),
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn state(&self) -> PowerState {
        self.key.state
    }

    pub fn period(&self) -> i32 {
        self.key.period
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_source(&self) -> bool {
        self.role == NodeRole::Source
    }

    pub fn is_sink(&self) -> bool {
        self.role == NodeRole::Sink
    }

    /// Net supply in the flow-conservation row: +1 source, -1 sink, 0 otherwise.
    pub fn demand_balance(&self) -> i32 {
        match self.role {
            NodeRole::Source => 1,
            NodeRole::Sink => -1,
            NodeRole::Interior => 0,
        }
    }

    /// Memoized dispatch point, if already computed.
    pub fn dispatch(&self) -> Option<&DispatchPoint> {
        self.dispatch.get()
    }

    pub fn dispatch_cost(&self) -> Option<f64> {
        self.dispatch.get().map(|d| d.cost)
    }

    /// Compute-if-absent accessor for the dispatch point.
    ///
    /// Only the first stored value is ever observed. Callers partition nodes
    /// so that each one is evaluated by a single worker.
    pub fn ensure_dispatch(&self, evaluator: &DispatchEvaluator<'_>) -> UcResult<&DispatchPoint> {
        if let Some(point) = self.dispatch.get() {
            return Ok(point);
        }
        if self.is_sink() {
            return Err(UcError::invariant(format!(
                "sink node {} has no dispatch cost",
                self.key
            )));
        }
        let point = evaluator.evaluate(self)?;
        Ok(self.dispatch.get_or_init(|| point))
    }
}
