//! On/off state of the whole fleet in one period.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combinations::{combination_count, MAX_UNITS};
use crate::{UcError, UcResult};

/// Fixed-width on/off vector, one bit per unit.
///
/// Stored as the combination index plus the width. Unit `i` is the `i`-th
/// character of the identifier (leftmost is unit 0), i.e. bit `width - 1 - i`
/// of the index. Equality and hashing follow the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PowerState {
    width: u8,
    bits: u64,
}

impl PowerState {
    /// State with combination index `index` over `width` units.
    pub fn from_index(index: u64, width: usize) -> UcResult<Self> {
        if width > MAX_UNITS {
            return Err(UcError::config(format!(
                "{width} units exceed the enumerable limit of {MAX_UNITS}"
            )));
        }
        if index >= combination_count(width) {
            return Err(UcError::invariant(format!(
                "combination index {index} out of range for {width} units"
            )));
        }
        Ok(Self::from_index_unchecked(index, width))
    }

    pub(crate) fn from_index_unchecked(index: u64, width: usize) -> Self {
        Self {
            width: width as u8,
            bits: index,
        }
    }

    pub fn from_bools(units: &[bool]) -> UcResult<Self> {
        if units.len() > MAX_UNITS {
            return Err(UcError::config(format!(
                "{} units exceed the enumerable limit of {MAX_UNITS}",
                units.len()
            )));
        }
        let bits = units
            .iter()
            .fold(0u64, |acc, &on| (acc << 1) | u64::from(on));
        Ok(Self::from_index_unchecked(bits, units.len()))
    }

    /// All units offline.
    pub fn all_off(width: usize) -> UcResult<Self> {
        Self::from_index(0, width)
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Combination index (the identifier read as a binary number).
    pub fn index(&self) -> u64 {
        self.bits
    }

    pub fn is_on(&self, unit: usize) -> bool {
        debug_assert!(unit < self.width());
        (self.bits >> (self.width() - 1 - unit)) & 1 == 1
    }

    /// Indices of online units, ascending.
    pub fn active_units(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width()).filter(move |&i| self.is_on(i))
    }

    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.width()).map(|i| self.is_on(i)).collect()
    }

    /// Units offline in `self` and online in `next`.
    pub fn started_units(&self, next: &PowerState) -> impl Iterator<Item = usize> + '_ {
        let started = !self.bits & next.bits;
        let width = self.width();
        (0..width).filter(move |&i| (started >> (width - 1 - i)) & 1 == 1)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in 0..self.width() {
            f.write_str(if self.is_on(unit) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for PowerState {
    type Err = UcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let units = crate::combinations::bin_str_to_bools(s)?;
        Self::from_bools(&units)
    }
}

impl TryFrom<String> for PowerState {
    type Error = UcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PowerState> for String {
    fn from(state: PowerState) -> Self {
        state.to_string()
    }
}
