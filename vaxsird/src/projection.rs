//! End-to-end projection: estimate the day-0 state from history, then run
//! the SIRD model forward and report the final day's increments.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Divergence, EngineResult, ProjectionError};
use crate::math::series::round_count;
use crate::model::estimator::PopulationState;
use crate::model::params::ModelParams;
use crate::model::sird::{DaySnapshot, SirdModel, SirdState};
use crate::model::vaccination::VaccinationRate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRequest {
    /// Daily new cases, oldest first.
    pub cases: Vec<u64>,
    pub population: u64,
    pub cumulative_deaths: u64,
    pub vaccination_rate: VaccinationRate,
    /// Days ahead of the last observation; must be >= 1.
    pub days: u32,
    /// Fail instead of computing through a physically invalid day-0 state.
    #[serde(default)]
    pub strict: bool,
}

/// Projected increments on the requested day (not cumulative totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub new_cases: i64,
    pub new_deaths: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub result: ProjectionResult,
    pub initial: PopulationState,
    pub diagnostics: Vec<Divergence>,
}

/// Ten years of daily steps.
pub const DEFAULT_MAX_DAYS: u32 = 3650;

pub struct Projector {
    params: ModelParams,
    max_days: u32,
}

impl Default for Projector {
    fn default() -> Self {
        Self { params: ModelParams::default(), max_days: DEFAULT_MAX_DAYS }
    }
}

impl Projector {
    pub fn new(params: ModelParams) -> EngineResult<Self> {
        params.check().map_err(|e| ProjectionError::invalid(format!("{e:#}")))?;
        Ok(Self { params, max_days: DEFAULT_MAX_DAYS })
    }

    /// Longest horizon a request may ask for; bounds both work and trajectory size.
    pub fn with_max_days(mut self, max_days: u32) -> EngineResult<Self> {
        if max_days < 1 {
            return Err(ProjectionError::invalid("max_days must be >= 1"));
        }
        self.max_days = max_days;
        Ok(self)
    }

    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    fn prepare(&self, req: &ProjectionRequest) -> EngineResult<(SirdModel, PopulationState, Vec<Divergence>)> {
        if req.days < 1 {
            return Err(ProjectionError::invalid("projection horizon must be >= 1 day"));
        }
        if req.days > self.max_days {
            return Err(ProjectionError::invalid(format!(
                "projection horizon of {} days exceeds the limit of {} days",
                req.days, self.max_days
            )));
        }
        let initial = PopulationState::estimate(&req.cases, req.population, req.cumulative_deaths, &self.params)?;
        let diagnostics = initial.divergences();
        for d in &diagnostics {
            warn!("model divergence: {}", d);
        }
        if req.strict && !diagnostics.is_empty() {
            return Err(ProjectionError::Divergence(diagnostics));
        }
        let model = SirdModel::new(self.params.clone(), req.population)
            .map_err(|e| ProjectionError::invalid(format!("{e:#}")))?;
        Ok((model, initial, diagnostics))
    }

    pub fn project(&self, req: &ProjectionRequest) -> EngineResult<Projection> {
        let (model, initial, diagnostics) = self.prepare(req)?;
        let mut state = SirdState::seed(&initial, req.vaccination_rate);
        let flows = model
            .advance(&mut state, req.days)
            .ok_or_else(|| ProjectionError::invalid("projection horizon must be >= 1 day"))?;
        let result = ProjectionResult {
            new_cases: round_count(flows.new_cases()),
            new_deaths: round_count(flows.new_deaths),
        };
        debug!(
            "projected day {} at vaccination {:.4}: new_cases={} new_deaths={}",
            req.days,
            req.vaccination_rate.fraction(),
            result.new_cases,
            result.new_deaths
        );
        Ok(Projection { result, initial, diagnostics })
    }

    /// Every day from 0 through `req.days`, for plotting and debugging.
    pub fn trajectory(&self, req: &ProjectionRequest) -> EngineResult<Vec<DaySnapshot>> {
        let (model, initial, _) = self.prepare(req)?;
        let seed = SirdState::seed(&initial, req.vaccination_rate);
        Ok(model.trajectory(seed).take(req.days as usize + 1).collect())
    }
}

/// Project new cases and deaths `days` ahead with the default model constants.
/// `vaccination_rate` is a fraction in [0, 1].
pub fn run_projection(
    cases: &[u64],
    population: u64,
    cumulative_deaths: u64,
    vaccination_rate: f64,
    days: u32,
) -> EngineResult<ProjectionResult> {
    let req = ProjectionRequest {
        cases: cases.to_vec(),
        population,
        cumulative_deaths,
        vaccination_rate: VaccinationRate::from_fraction(vaccination_rate)?,
        days,
        strict: false,
    };
    Ok(Projector::default().project(&req)?.result)
}
