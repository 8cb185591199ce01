//! Validated problem instance: fleet, demand profile and initial status.

use serde::{Deserialize, Serialize};

use crate::combinations::MAX_UNITS;
use crate::{PowerState, UcError, UcResult, UnitSpec};

/// Demand per period (MW), `len() == n_periods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandProfile(Vec<f64>);

impl DemandProfile {
    pub fn new(values: Vec<f64>) -> Self {
        DemandProfile(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Demand in `period`. Panics outside `0..len()`.
    pub fn at(&self, period: usize) -> f64 {
        self.0[period]
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// A unit commitment instance that passed validation.
///
/// Immutable once built; every construction phase borrows it.
#[derive(Debug, Clone, Serialize)]
pub struct UcProblem {
    units: Vec<UnitSpec>,
    demand: DemandProfile,
    initial_status: PowerState,
}

impl UcProblem {
    /// Validate and assemble a problem.
    ///
    /// Fails with [`UcError::Config`] on any inconsistency so that nothing is
    /// constructed from bad data.
    pub fn new(
        units: Vec<UnitSpec>,
        demand: DemandProfile,
        initial_status: PowerState,
    ) -> UcResult<Self> {
        if units.len() > MAX_UNITS {
            return Err(UcError::config(format!(
                "{} units exceed the enumerable limit of {MAX_UNITS}",
                units.len()
            )));
        }
        if demand.is_empty() {
            return Err(UcError::config("demand profile has no periods"));
        }
        if let Some((t, d)) = demand
            .values()
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(UcError::config(format!(
                "demand[{t}] = {d} must be finite and non-negative"
            )));
        }
        if initial_status.width() != units.len() {
            return Err(UcError::config(format!(
                "initial status '{initial_status}' has {} positions, expected {}",
                initial_status.width(),
                units.len()
            )));
        }
        for (position, unit) in units.iter().enumerate() {
            validate_unit(position, unit)?;
        }

        Ok(Self {
            units,
            demand,
            initial_status,
        })
    }

    pub fn units(&self) -> &[UnitSpec] {
        &self.units
    }

    pub fn n_units(&self) -> usize {
        self.units.len()
    }

    pub fn n_periods(&self) -> usize {
        self.demand.len()
    }

    pub fn demand(&self) -> &DemandProfile {
        &self.demand
    }

    pub fn initial_status(&self) -> PowerState {
        self.initial_status
    }

    /// Minimum up/down time per unit.
    pub fn tau(&self) -> Vec<usize> {
        self.units.iter().map(UnitSpec::tau).collect()
    }

    /// Combined minimum output of the units online in `state`.
    pub fn p_min_sum(&self, state: &PowerState) -> f64 {
        state.active_units().map(|i| self.units[i].p_min).sum()
    }

    /// Combined maximum output of the units online in `state`.
    pub fn p_max_sum(&self, state: &PowerState) -> f64 {
        state.active_units().map(|i| self.units[i].p_max).sum()
    }

    /// Whether the online units of `state` can exactly meet `demand[period]`.
    pub fn can_serve(&self, state: &PowerState, period: usize) -> bool {
        let d = self.demand.at(period);
        self.p_min_sum(state) <= d && d <= self.p_max_sum(state)
    }
}

fn validate_unit(position: usize, unit: &UnitSpec) -> UcResult<()> {
    let name = format!("unit {position}");
    if unit.index != position {
        return Err(UcError::config(format!(
            "{name} declares index {}",
            unit.index
        )));
    }
    let finite = [
        unit.p_min,
        unit.p_max,
        unit.c0,
        unit.c1,
        unit.c2,
        unit.startup_cost,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(UcError::config(format!("{name} has non-finite parameters")));
    }
    if unit.p_min < 0.0 || unit.p_min > unit.p_max {
        return Err(UcError::config(format!(
            "{name}: power limits [{}, {}] are invalid",
            unit.p_min, unit.p_max
        )));
    }
    if unit.c2 < 0.0 {
        return Err(UcError::config(format!(
            "{name}: quadratic cost coefficient {} makes dispatch non-convex",
            unit.c2
        )));
    }
    if unit.startup_cost < 0.0 {
        return Err(UcError::config(format!(
            "{name}: startup cost {} is negative",
            unit.startup_cost
        )));
    }
    if unit.min_up_time != unit.min_down_time {
        return Err(UcError::config(format!(
            "{name}: min_up_time ({}) != min_down_time ({})",
            unit.min_up_time, unit.min_down_time
        )));
    }
    Ok(())
}
