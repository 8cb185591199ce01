//! Time-expanded commitment network.
//!
//! Layer `0` holds the source (period `-1`), layers `1..=n` the feasible
//! interior states of periods `0..n`, and layer `n + 1` the sink. Arcs only
//! connect consecutive layers, so the graph is a DAG and every source-sink
//! path visits exactly one state per period.

mod arc;
mod builder;
mod node;

pub use arc::{ArcKey, UcArc};
pub use builder::{BuildStats, NetworkBuilder};
pub use node::{NodeKey, NodeRole, UcNode, SOURCE_PERIOD};

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

pub struct UcNetwork {
    graph: DiGraph<UcNode, UcArc>,
    index: HashMap<NodeKey, NodeIndex>,
    layers: Vec<Vec<NodeIndex>>,
    source: NodeIndex,
    sink: NodeIndex,
    n_periods: usize,
}

impl UcNetwork {
    pub fn graph(&self) -> &DiGraph<UcNode, UcArc> {
        &self.graph
    }

    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    pub fn node(&self, idx: NodeIndex) -> &UcNode {
        &self.graph[idx]
    }

    pub fn arc(&self, edge: EdgeIndex) -> &UcArc {
        &self.graph[edge]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Lookup by value identifier.
    pub fn find(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Nodes of `period`, from `-1` (source) to `n_periods` (sink).
    pub fn layer(&self, period: i32) -> &[NodeIndex] {
        usize::try_from(period + 1)
            .ok()
            .and_then(|l| self.layers.get(l))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Interior layers `0..n_periods`, in period order.
    pub fn interior_layers(&self) -> impl Iterator<Item = &[NodeIndex]> + '_ {
        self.layers[1..=self.n_periods].iter().map(Vec::as_slice)
    }

    /// Every node except the sink, layer by layer.
    pub fn tail_nodes(&self) -> Vec<NodeIndex> {
        self.layers[..=self.n_periods].iter().flatten().copied().collect()
    }

    pub fn incoming(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.id())
    }

    pub fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
    }

    /// `(tail, head)` node indices of an arc.
    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    pub fn arcs(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Whether some interior period has no node left after pruning.
    pub fn has_empty_period(&self) -> bool {
        self.interior_layers().any(|layer| layer.is_empty())
    }
}
