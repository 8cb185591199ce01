//! Temporal conflicts from minimum up/down times.
//!
//! When an arc switches some unit, the reverse switch of that unit is
//! forbidden for a window of following periods. The window of a unit is
//! its `tau`; when several switched units forbid the same state, the
//! longest window wins.
//!
//! For an arc `(tail, t) -> (head, t + 1)`:
//!
//! 1. `P = difference(tail, head)`, skipped if all free or if `head` is the sink
//! 2. split `P` into single-position patterns, negate each
//! 3. every state matching a negated pattern is forbidden for
//!    `w = max tau` over the patterns it matches
//! 4. forbidden periods are `t + 2 .. end` with `end` per [`ConflictHorizon`]
//! 5. the conflict set is every arc entering a forbidden node that exists

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::EdgeIndex;
use tracing::{debug, info};
use ucnet_core::{ConflictHorizon, Pattern, PowerState, UcProblem, UcResult};

use crate::network::{NodeKey, UcNetwork};
use crate::parallel::WorkerPool;

/// If `trigger` carries flow, no arc in `forbidden` may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSet {
    pub trigger: EdgeIndex,
    pub forbidden: Vec<EdgeIndex>,
    /// Distinct head periods of `forbidden`; at most one of them is active
    /// per period on any path.
    pub periods: usize,
}

impl ConflictSet {
    /// Tightest valid big-M for `Σ forbidden ≤ M·(1 − trigger)`.
    pub fn big_m(&self) -> f64 {
        self.periods as f64
    }
}

#[derive(Debug, Clone)]
pub struct TemporalConflictGenerator {
    n_periods: usize,
    tau: Vec<usize>,
    horizon: ConflictHorizon,
}

impl TemporalConflictGenerator {
    pub fn new(problem: &UcProblem, horizon: ConflictHorizon) -> Self {
        Self {
            n_periods: problem.n_periods(),
            tau: problem.tau(),
            horizon,
        }
    }

    /// Half-open range of forbidden periods after a switch arriving at
    /// `head_period`, for a window of `tau` periods.
    pub fn window(&self, head_period: i32, tau: usize) -> std::ops::Range<i32> {
        let n = self.n_periods as i32;
        let tau = tau as i32;
        let start = head_period + 1;
        let end = match self.horizon {
            ConflictHorizon::Truncated => (head_period + tau - 1).min(n - 1),
            ConflictHorizon::Full => (head_period + tau).min(n),
        };
        if end <= start {
            start..start
        } else {
            start..end
        }
    }

    /// Forbidden `(state, period)` keys implied by the transition
    /// `tail -> head`, sorted.
    ///
    /// Keys are returned whether or not the network holds such a node.
    pub fn forbidden_nodes(&self, tail: &NodeKey, head: &NodeKey) -> UcResult<Vec<NodeKey>> {
        if head.period >= self.n_periods as i32 {
            return Ok(Vec::new());
        }
        let pattern = Pattern::difference(&tail.state, &head.state)?;
        if pattern.is_all_free() {
            return Ok(Vec::new());
        }

        let mut windows: BTreeMap<PowerState, usize> = BTreeMap::new();
        for (simple, unit) in pattern.split()? {
            let tau = self.tau[unit];
            for state in simple.negate().matching_states() {
                windows
                    .entry(state)
                    .and_modify(|w| *w = (*w).max(tau))
                    .or_insert(tau);
            }
        }

        let mut keys: Vec<NodeKey> = windows
            .into_iter()
            .flat_map(|(state, w)| {
                self.window(head.period, w)
                    .map(move |period| NodeKey::new(state, period))
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Conflict set of a single arc, or `None` when it forbids nothing in
    /// this network.
    pub fn conflicts_for(
        &self,
        network: &UcNetwork,
        edge: EdgeIndex,
    ) -> UcResult<Option<ConflictSet>> {
        let arc = network.arc(edge);
        let keys = self.forbidden_nodes(&arc.tail(), &arc.head())?;

        let mut forbidden = BTreeSet::new();
        let mut periods = BTreeSet::new();
        for key in &keys {
            if let Some(idx) = network.find(key) {
                let before = forbidden.len();
                forbidden.extend(network.incoming(idx));
                if forbidden.len() > before {
                    periods.insert(key.period);
                }
            }
        }
        if forbidden.is_empty() {
            return Ok(None);
        }
        Ok(Some(ConflictSet {
            trigger: edge,
            forbidden: forbidden.into_iter().collect(),
            periods: periods.len(),
        }))
    }

    /// Conflict sets of every arc, partitioned across the pool. The result is
    /// ordered by trigger arc.
    pub fn generate(&self, network: &UcNetwork, pool: &WorkerPool) -> UcResult<Vec<ConflictSet>> {
        let edges: Vec<EdgeIndex> = network.arcs().collect();
        let sets = pool.try_map_chunks(&edges, |chunk| {
            let mut out = Vec::new();
            for &edge in chunk {
                if let Some(set) = self.conflicts_for(network, edge)? {
                    debug!(
                        arc = %network.arc(edge).key(),
                        forbidden = set.forbidden.len(),
                        "conflict set"
                    );
                    out.push(set);
                }
            }
            Ok(out)
        })?;
        info!(
            "Generated {} conflict sets over {} arcs ({} horizon)",
            sets.len(),
            edges.len(),
            self.horizon
        );
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucnet_core::{DemandProfile, UnitSpec};

    fn problem(n_periods: usize, tau: &[usize]) -> UcProblem {
        let units = tau
            .iter()
            .enumerate()
            .map(|(index, &t)| UnitSpec {
                index,
                p_min: 0.0,
                p_max: 10.0,
                c0: 0.0,
                c1: 1.0,
                c2: 0.0,
                min_up_time: t,
                min_down_time: t,
                startup_cost: 0.0,
            })
            .collect();
        UcProblem::new(
            units,
            DemandProfile::new(vec![1.0; n_periods]),
            PowerState::all_off(tau.len()).unwrap(),
        )
        .unwrap()
    }

    fn key(state: &str, period: i32) -> NodeKey {
        NodeKey::new(state.parse().unwrap(), period)
    }

    #[test]
    fn test_truncated_window() {
        let g = TemporalConflictGenerator::new(&problem(10, &[4]), ConflictHorizon::Truncated);
        assert_eq!(g.window(2, 4), 3..5);
        assert_eq!(g.window(7, 4), 8..9);
        assert_eq!(g.window(8, 4), 9..9);
        assert!(g.window(0, 2).is_empty());
        assert!(g.window(0, 1).is_empty());
    }

    #[test]
    fn test_full_window() {
        let g = TemporalConflictGenerator::new(&problem(10, &[4]), ConflictHorizon::Full);
        assert_eq!(g.window(2, 4), 3..6);
        assert_eq!(g.window(7, 4), 8..10);
        assert_eq!(g.window(0, 2), 1..2);
        assert!(g.window(0, 1).is_empty());
    }

    #[test]
    fn test_no_switch_forbids_nothing() {
        let g = TemporalConflictGenerator::new(&problem(10, &[5, 5]), ConflictHorizon::Truncated);
        assert!(g.forbidden_nodes(&key("10", 0), &key("10", 1)).unwrap().is_empty());
    }

    #[test]
    fn test_sink_head_forbids_nothing() {
        let g = TemporalConflictGenerator::new(&problem(3, &[5]), ConflictHorizon::Full);
        assert!(g.forbidden_nodes(&key("1", 2), &key("0", 3)).unwrap().is_empty());
    }

    #[test]
    fn test_switch_on_forbids_off_states() {
        // Unit 0 turns on at period 1. With tau = 4 and a truncated horizon,
        // states with unit 0 off are forbidden in periods 2 and 3.
        let g = TemporalConflictGenerator::new(&problem(10, &[4, 1]), ConflictHorizon::Truncated);
        let keys = g.forbidden_nodes(&key("00", 0), &key("10", 1)).unwrap();
        assert_eq!(
            keys,
            vec![key("00", 2), key("00", 3), key("01", 2), key("01", 3)]
        );
    }

    #[test]
    fn test_longest_window_wins() {
        // Both units switch on. '00' violates both and takes the longer window.
        let g = TemporalConflictGenerator::new(&problem(10, &[3, 5]), ConflictHorizon::Full);
        let keys = g.forbidden_nodes(&key("00", 0), &key("11", 1)).unwrap();
        let periods_of = |s: &str| {
            keys.iter()
                .filter(|k| k.state.to_string() == s)
                .map(|k| k.period)
                .collect::<Vec<_>>()
        };
        assert_eq!(periods_of("00"), vec![2, 3, 4, 5]);
        assert_eq!(periods_of("01"), vec![2, 3]);
        assert_eq!(periods_of("10"), vec![2, 3, 4, 5]);
        assert!(periods_of("11").is_empty());
    }
}
