//! Node enumeration, feasibility filter, arc wiring and pricing.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, info, warn};
use ucnet_core::combinations::{all_states, combination_count};
use ucnet_core::{EvaluationMode, NetworkOptions, UcProblem, UcResult};
use web_time::Instant;

use super::{UcArc, UcNetwork, UcNode};
use crate::costs::ArcCostModel;
use crate::dispatch::DispatchEvaluator;
use crate::parallel::WorkerPool;

/// Counters reported after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildStats {
    /// `2^n_units · n_periods` interior candidates before filtering.
    pub candidate_nodes: usize,
    pub pruned_nodes: usize,
    /// Interior nodes kept per period.
    pub nodes_per_period: Vec<usize>,
    pub arcs: usize,
    /// Nodes whose dispatch cost is the infeasibility penalty.
    pub penalized_nodes: usize,
    pub build_time_ms: u128,
}

impl BuildStats {
    pub fn pruned_percent(&self) -> f64 {
        if self.candidate_nodes == 0 {
            0.0
        } else {
            100.0 * self.pruned_nodes as f64 / self.candidate_nodes as f64
        }
    }
}

pub struct NetworkBuilder<'a> {
    problem: &'a UcProblem,
    options: &'a NetworkOptions,
    costs: ArcCostModel,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(problem: &'a UcProblem, options: &'a NetworkOptions) -> Self {
        Self {
            problem,
            options,
            costs: ArcCostModel::new(problem),
        }
    }

    /// Build the network and price every arc.
    pub fn build(
        &self,
        evaluator: &DispatchEvaluator<'_>,
        pool: &WorkerPool,
    ) -> UcResult<(UcNetwork, BuildStats)> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let mut network = self.create_nodes(&mut stats);

        info!(
            "Created {} interior nodes from {} candidates ({:.1}% pruned)",
            stats.nodes_per_period.iter().sum::<usize>(),
            stats.candidate_nodes,
            stats.pruned_percent()
        );

        if self.options.evaluation == EvaluationMode::Eager {
            self.evaluate_nodes(&network, evaluator, pool)?;
        }

        self.create_arcs(&mut network, pool)?;
        stats.arcs = network.arc_count();
        info!("Created {} arcs", stats.arcs);

        self.price_arcs(&network, evaluator, pool)?;

        stats.penalized_nodes = network
            .graph
            .node_weights()
            .filter(|n| n.dispatch().is_some_and(|d| d.penalized))
            .count();
        if stats.penalized_nodes > 0 {
            warn!(
                "{} nodes carry the infeasibility penalty cost",
                stats.penalized_nodes
            );
        }
        stats.build_time_ms = start.elapsed().as_millis();
        debug!(elapsed_ms = stats.build_time_ms as u64, "network built");
        Ok((network, stats))
    }

    fn create_nodes(&self, stats: &mut BuildStats) -> UcNetwork {
        let problem = self.problem;
        let n_units = problem.n_units();
        let n_periods = problem.n_periods();

        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let mut layers: Vec<Vec<NodeIndex>> = Vec::with_capacity(n_periods + 2);

        let source = graph.add_node(UcNode::source(problem.initial_status()));
        index.insert(graph[source].key(), source);
        layers.push(vec![source]);

        let per_period = combination_count(n_units) as usize;
        for period in 0..n_periods {
            let mut layer = Vec::new();
            for state in all_states(n_units) {
                if self.options.prune_infeasible && !problem.can_serve(&state, period) {
                    continue;
                }
                let idx = graph.add_node(UcNode::interior(state, period));
                index.insert(graph[idx].key(), idx);
                layer.push(idx);
            }
            stats.candidate_nodes += per_period;
            stats.pruned_nodes += per_period - layer.len();
            stats.nodes_per_period.push(layer.len());
            if layer.is_empty() {
                warn!(period, "no unit combination can meet demand");
            }
            debug!(period, nodes = layer.len(), "layer created");
            layers.push(layer);
        }

        let sink = graph.add_node(UcNode::sink(problem.initial_status(), n_periods));
        index.insert(graph[sink].key(), sink);
        layers.push(vec![sink]);

        UcNetwork {
            graph,
            index,
            layers,
            source,
            sink,
            n_periods,
        }
    }

    fn evaluate_nodes(
        &self,
        network: &UcNetwork,
        evaluator: &DispatchEvaluator<'_>,
        pool: &WorkerPool,
    ) -> UcResult<()> {
        let start = Instant::now();
        let tails = network.tail_nodes();
        pool.try_map_chunks(&tails, |chunk| {
            for &idx in chunk {
                network.node(idx).ensure_dispatch(evaluator)?;
            }
            Ok(Vec::<()>::new())
        })?;
        info!(
            "Evaluated {} node dispatches with {} in {} ms",
            tails.len(),
            evaluator.backend_id(),
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Complete bipartite wiring between consecutive layers.
    ///
    /// Transition costs are computed per tail in parallel; edges are inserted
    /// afterwards in a fixed order.
    fn create_arcs(&self, network: &mut UcNetwork, pool: &WorkerPool) -> UcResult<()> {
        let tails = network.tail_nodes();
        let view = &*network;
        let wired = pool.try_map_chunks(&tails, |chunk| {
            let mut out = Vec::new();
            for &tail_idx in chunk {
                let tail = view.node(tail_idx);
                for &head_idx in view.layer(tail.period() + 1) {
                    let head = view.node(head_idx);
                    let transition = self.costs.transition_cost(&tail.key(), head);
                    out.push((tail_idx, head_idx, UcArc::new(tail, head, transition)?));
                }
            }
            Ok(out)
        })?;

        network.graph.reserve_edges(wired.len());
        for (tail, head, arc) in wired {
            network.graph.add_edge(tail, head, arc);
        }
        Ok(())
    }

    /// Set every arc's total cost. Each tail, and therefore each lazy
    /// dispatch evaluation, belongs to exactly one chunk.
    fn price_arcs(
        &self,
        network: &UcNetwork,
        evaluator: &DispatchEvaluator<'_>,
        pool: &WorkerPool,
    ) -> UcResult<()> {
        let tails = network.tail_nodes();
        pool.try_map_chunks(&tails, |chunk| {
            for &tail_idx in chunk {
                let tail = network.node(tail_idx);
                for edge in network.outgoing(tail_idx) {
                    self.costs.total_cost(network.arc(edge), tail, evaluator)?;
                }
            }
            Ok(Vec::<()>::new())
        })?;
        Ok(())
    }
}
