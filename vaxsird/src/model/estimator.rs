//! Day-0 compartment totals derived from a historical daily case series.
//!
//! A case counts as infectious for `infectious_days` after it is reported;
//! anything older has left the infectious pool, either recovered or dead.

use log::debug;
use serde::Serialize;

use crate::error::{Divergence, EngineResult, ProjectionError};
use crate::math::series::{checked_sum, head_sum, tail_sum};
use crate::model::params::ModelParams;

fn ensure_non_empty(series: &[u64], what: &str) -> EngineResult<()> {
    if series.is_empty() {
        return Err(ProjectionError::invalid(format!("{what} series is empty")));
    }
    Ok(())
}

fn sum_or_invalid(total: Option<u64>, what: &str) -> EngineResult<u64> {
    total.ok_or_else(|| ProjectionError::invalid(format!("{what} total overflows a 64-bit count")))
}

fn to_signed(v: u64, what: &str) -> EngineResult<i64> {
    i64::try_from(v).map_err(|_| ProjectionError::invalid(format!("{what} {v} exceeds {}", i64::MAX)))
}

/// Sum of the last `infectious_days` daily cases (all of them for short series).
pub fn estimate_active_infections(cases: &[u64], infectious_days: usize) -> EngineResult<u64> {
    ensure_non_empty(cases, "case")?;
    sum_or_invalid(tail_sum(cases, infectious_days), "active case")
}

/// Not floored at zero; a negative value means cases exceed the stated population.
pub fn estimate_susceptible(population: u64, active_infections: u64) -> EngineResult<i64> {
    Ok(to_signed(population, "population")? - to_signed(active_infections, "active infections")?)
}

/// Cases older than the infectious window, minus deaths. Zero while nobody
/// has yet left the window.
pub fn estimate_cumulative_recoveries(
    cases: &[u64],
    cumulative_deaths: u64,
    infectious_days: usize,
) -> EngineResult<i64> {
    ensure_non_empty(cases, "case")?;
    if cases.len() <= infectious_days {
        return Ok(0);
    }
    let exited = sum_or_invalid(head_sum(cases, infectious_days), "historical case")?;
    Ok(to_signed(exited, "historical cases")? - to_signed(cumulative_deaths, "cumulative deaths")?)
}

pub fn estimate_cumulative_deaths(daily_deaths: &[u64]) -> EngineResult<u64> {
    ensure_non_empty(daily_deaths, "death")?;
    sum_or_invalid(checked_sum(daily_deaths), "death")
}

/// Day-0 snapshot seeding the forward simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationState {
    pub population: u64,
    pub active_infections: u64,
    pub susceptible: i64,
    pub recovered: i64,
    pub deaths: u64,
}

impl PopulationState {
    pub fn estimate(
        cases: &[u64],
        population: u64,
        cumulative_deaths: u64,
        params: &ModelParams,
    ) -> EngineResult<Self> {
        if population == 0 {
            return Err(ProjectionError::invalid("population must be > 0"));
        }
        let k = params.infectious_days;
        let active_infections = estimate_active_infections(cases, k)?;
        let state = Self {
            population,
            active_infections,
            susceptible: estimate_susceptible(population, active_infections)?,
            recovered: estimate_cumulative_recoveries(cases, cumulative_deaths, k)?,
            deaths: cumulative_deaths,
        };
        debug!(
            "day-0 state: N={} I0={} S0={} R0={} D0={}",
            state.population, state.active_infections, state.susceptible, state.recovered, state.deaths
        );
        Ok(state)
    }

    /// Inconsistencies the model tolerates but a stricter caller may want to reject.
    pub fn divergences(&self) -> Vec<Divergence> {
        let mut out = Vec::new();
        if self.susceptible < 0 {
            out.push(Divergence::NegativeSusceptible { susceptible: self.susceptible });
        }
        if self.recovered < 0 {
            out.push(Divergence::NegativeRecoveries { recovered: self.recovered });
        }
        out
    }
}
