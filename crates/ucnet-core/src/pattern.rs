//! Three-valued state patterns over `{0, 1, x}`.
//!
//! A pattern fixes some units to on (`1`) or off (`0`) and leaves the rest
//! free (`x`). Patterns describe what an arc commits to (the difference
//! between its endpoint states) and, once negated, which future states would
//! break that commitment.
//!
//! ```
//! use ucnet_core::{Pattern, PowerState};
//!
//! let tail: PowerState = "0000".parse().unwrap();
//! let head: PowerState = "0011".parse().unwrap();
//! let diff = Pattern::difference(&tail, &head).unwrap();
//! assert_eq!(diff.to_string(), "xx11");
//! assert_eq!(diff.negate().to_string(), "xx00");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::combinations::MAX_UNITS;
use crate::{PowerState, UcError, UcResult};

/// One position of a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trit {
    Off,
    On,
    Free,
}

impl Trit {
    fn negate(self) -> Self {
        match self {
            Trit::Off => Trit::On,
            Trit::On => Trit::Off,
            Trit::Free => Trit::Free,
        }
    }

    fn as_char(self) -> char {
        match self {
            Trit::Off => '0',
            Trit::On => '1',
            Trit::Free => 'x',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Trit>);

impl Pattern {
    /// Every position free.
    pub fn free(width: usize) -> Self {
        Pattern(vec![Trit::Free; width])
    }

    /// Free where `tail` and `head` agree, `head`'s value where they differ.
    pub fn difference(tail: &PowerState, head: &PowerState) -> UcResult<Self> {
        if tail.width() != head.width() {
            return Err(UcError::invariant(format!(
                "cannot compare states of width {} and {}",
                tail.width(),
                head.width()
            )));
        }
        Ok(Pattern(
            (0..tail.width())
                .map(|i| match (tail.is_on(i), head.is_on(i)) {
                    (a, b) if a == b => Trit::Free,
                    (_, true) => Trit::On,
                    (_, false) => Trit::Off,
                })
                .collect(),
        ))
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn is_all_free(&self) -> bool {
        self.0.iter().all(|&t| t == Trit::Free)
    }

    /// Positions that are not free, ascending.
    pub fn fixed_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &t)| t != Trit::Free)
            .map(|(i, _)| i)
    }

    /// One single-position pattern per fixed position, paired with it.
    ///
    /// `x10x1` splits into `x1xxx`, `xx0xx` and `xxxx1`. An all-free pattern
    /// carries no commitment and cannot be split.
    pub fn split(&self) -> UcResult<Vec<(Pattern, usize)>> {
        if self.is_all_free() {
            return Err(UcError::invariant(format!(
                "pattern '{self}' has no fixed position to split on"
            )));
        }
        Ok(self
            .fixed_positions()
            .map(|i| {
                let mut simple = Pattern::free(self.width());
                simple.0[i] = self.0[i];
                (simple, i)
            })
            .collect())
    }

    /// Swap `0` and `1`, keep `x`.
    pub fn negate(&self) -> Self {
        Pattern(self.0.iter().map(|t| t.negate()).collect())
    }

    pub fn matches(&self, state: &PowerState) -> bool {
        state.width() == self.width()
            && self.0.iter().enumerate().all(|(i, &t)| match t {
                Trit::Free => true,
                Trit::On => state.is_on(i),
                Trit::Off => !state.is_on(i),
            })
    }

    /// All full-width states matching this pattern, in increasing index order.
    ///
    /// Equivalent to filtering [`crate::combinations::all_states`] with
    /// [`Pattern::matches`], but enumerates only the free positions.
    pub fn matching_states(&self) -> Vec<PowerState> {
        let width = self.width();
        let bit = |i: usize| 1u64 << (width - 1 - i);

        let base = self
            .0
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == Trit::On)
            .fold(0u64, |acc, (i, _)| acc | bit(i));
        // Free positions from least to most significant, so the counter walks
        // the matching indices in ascending order.
        let free_bits: Vec<u64> = (0..width)
            .rev()
            .filter(|&i| self.0[i] == Trit::Free)
            .map(bit)
            .collect();

        (0..1u64 << free_bits.len())
            .map(|counter| {
                let spread = free_bits
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| (counter >> k) & 1 == 1)
                    .fold(base, |acc, (_, &b)| acc | b);
                PowerState::from_index_unchecked(spread, width)
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.0 {
            write!(f, "{}", t.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = UcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width = s.chars().count();
        if width > MAX_UNITS {
            return Err(UcError::Parse(format!(
                "pattern of width {width} exceeds the enumerable limit of {MAX_UNITS}"
            )));
        }
        s.chars()
            .map(|c| match c {
                '0' => Ok(Trit::Off),
                '1' => Ok(Trit::On),
                'x' => Ok(Trit::Free),
                other => Err(UcError::Parse(format!(
                    "invalid character '{other}' in pattern '{s}'"
                ))),
            })
            .collect::<UcResult<Vec<_>>>()
            .map(Pattern)
    }
}
