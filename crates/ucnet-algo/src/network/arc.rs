//! Arcs between consecutive layers.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use ucnet_core::{UcError, UcResult};

use super::node::{NodeKey, UcNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArcKey {
    pub tail: NodeKey,
    pub head: NodeKey,
}

impl fmt::Display for ArcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.tail, self.head)
    }
}

/// Transition from `tail` in period `t` to `head` in period `t + 1`.
///
/// The transition cost is fixed at construction. The total cost (tail
/// dispatch plus transition) is priced once, after the tail's dispatch is
/// known.
#[derive(Debug)]
pub struct UcArc {
    key: ArcKey,
    transition_cost: f64,
    total_cost: OnceLock<f64>,
}

impl UcArc {
    pub fn new(tail: &UcNode, head: &UcNode, transition_cost: f64) -> UcResult<Self> {
        if head.period() != tail.period() + 1 {
            return Err(UcError::invariant(format!(
                "arc {} -> {} skips or reverses periods",
                tail.key(),
                head.key()
            )));
        }
        Ok(Self {
            key: ArcKey {
                tail: tail.key(),
                head: head.key(),
            },
            transition_cost,
            total_cost: OnceLock::new(),
        })
    }

    pub fn key(&self) -> ArcKey {
        self.key
    }

    pub fn tail(&self) -> NodeKey {
        self.key.tail
    }

    pub fn head(&self) -> NodeKey {
        self.key.head
    }

    pub fn transition_cost(&self) -> f64 {
        self.transition_cost
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.total_cost.get().copied()
    }

    /// Store the total cost. A second call keeps the first value.
    pub(crate) fn set_total_cost(&self, cost: f64) -> f64 {
        *self.total_cost.get_or_init(|| cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_requires_consecutive_periods() {
        let a = UcNode::interior("10".parse().unwrap(), 0);
        let b = UcNode::interior("11".parse().unwrap(), 1);
        let c = UcNode::interior("11".parse().unwrap(), 2);

        let arc = UcArc::new(&a, &b, 5.0).unwrap();
        assert_eq!(arc.transition_cost(), 5.0);
        assert_eq!(arc.key().to_string(), "('10', 0) -> ('11', 1)");

        assert!(UcArc::new(&a, &c, 0.0).is_err());
        assert!(UcArc::new(&b, &a, 0.0).is_err());
    }

    #[test]
    fn test_total_cost_is_set_once() {
        let a = UcNode::source("0".parse().unwrap());
        let b = UcNode::interior("1".parse().unwrap(), 0);
        let arc = UcArc::new(&a, &b, 100.0).unwrap();
        assert!(arc.total_cost().is_none());
        assert_eq!(arc.set_total_cost(100.0), 100.0);
        assert_eq!(arc.set_total_cost(7.0), 100.0);
        assert_eq!(arc.total_cost(), Some(100.0));
    }
}
