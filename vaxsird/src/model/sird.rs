use serde::Serialize;

use crate::model::estimator::PopulationState;
use crate::model::params::ModelParams;
use crate::model::vaccination::VaccinationRate;

/// Six compartments of the vaccination-stratified SIRD model on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SirdState {
    pub s_unvacc: f64,
    pub s_vacc: f64,
    pub i_unvacc: f64,
    pub i_vacc: f64,
    pub recovered: f64,
    pub dead: f64,
}

impl SirdState {
    /// Split the day-0 susceptible pool by vaccination status. All active
    /// infections are placed in the unvaccinated pool.
    pub fn seed(init: &PopulationState, vacc: VaccinationRate) -> Self {
        let s0 = init.susceptible as f64;
        let v = vacc.fraction();
        Self {
            s_unvacc: s0 * (1.0 - v),
            s_vacc: s0 * v,
            i_unvacc: init.active_infections as f64,
            i_vacc: 0.0,
            recovered: init.recovered as f64,
            dead: init.deaths as f64,
        }
    }

    pub fn infectious(&self) -> f64 {
        self.i_unvacc + self.i_vacc
    }

    /// Mass across all six compartments. Starts above N by the cases older than
    /// the infectious window (they are counted in both S and R); nothing pulls it back.
    pub fn total(&self) -> f64 {
        self.s_unvacc + self.s_vacc + self.i_unvacc + self.i_vacc + self.recovered + self.dead
    }
}

/// Flows realised during one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepFlows {
    pub new_cases_unvacc: f64,
    pub new_cases_vacc: f64,
    pub new_deaths: f64,
}

impl StepFlows {
    pub fn new_cases(&self) -> f64 {
        self.new_cases_unvacc + self.new_cases_vacc
    }
}

pub struct SirdModel {
    pub params: ModelParams,
    // Fixed at the day-0 population for the whole run.
    n: f64,
}

impl SirdModel {
    pub fn new(params: ModelParams, population: u64) -> anyhow::Result<Self> {
        params.check()?;
        anyhow::ensure!(population > 0, "population must be > 0");
        Ok(Self { params, n: population as f64 })
    }

    /// Advance `state` by one day in place and return that day's flows.
    pub fn step(&self, state: &mut SirdState) -> StepFlows {
        let p = &self.params;
        let a = p.exit_rate();
        let b = p.contact_rate;
        let delta = p.fatality_rate;
        let x = p.vaccine_infection_reduction;
        let y = p.vaccine_death_reduction;
        let s = *state;

        // A pool cannot lose more people than it holds; such a flow is dropped entirely.
        let mut nc_uv = b * s.infectious() * s.s_unvacc / self.n;
        if nc_uv > s.s_unvacc { nc_uv = 0.0; }
        let mut nc_v = b * s.infectious() * s.s_vacc / self.n * (1.0 - x);
        if nc_v > s.s_vacc { nc_v = 0.0; }

        state.s_unvacc = s.s_unvacc - nc_uv;
        state.s_vacc = s.s_vacc - nc_v;
        state.i_unvacc = s.i_unvacc + nc_uv - a * s.i_unvacc;
        state.i_vacc = s.i_vacc + nc_v - a * s.i_vacc;
        state.recovered = s.recovered + a * s.i_unvacc * (1.0 - delta) + a * s.i_vacc * (1.0 - delta + delta * y);
        state.dead = s.dead + a * s.i_unvacc * delta + a * s.i_vacc * delta * (1.0 - y);

        StepFlows {
            new_cases_unvacc: nc_uv,
            new_cases_vacc: nc_v,
            new_deaths: state.dead - s.dead,
        }
    }

    /// Step `days` times and return the flows of the last day (`None` for zero days).
    pub fn advance(&self, state: &mut SirdState, days: u32) -> Option<StepFlows> {
        let mut last = None;
        for _ in 0..days {
            last = Some(self.step(state));
        }
        last
    }

    /// Lazy day-by-day snapshots starting with day 0. Unbounded; use `take`.
    pub fn trajectory(&self, initial: SirdState) -> Trajectory<'_> {
        Trajectory { model: self, state: initial, day: 0, started: false }
    }
}

/// State at the end of `day`, with the flows that produced it (none on day 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySnapshot {
    pub day: u32,
    pub state: SirdState,
    pub flows: Option<StepFlows>,
}

pub struct Trajectory<'a> {
    model: &'a SirdModel,
    state: SirdState,
    day: u32,
    started: bool,
}

impl Iterator for Trajectory<'_> {
    type Item = DaySnapshot;

    fn next(&mut self) -> Option<DaySnapshot> {
        if !self.started {
            self.started = true;
            return Some(DaySnapshot { day: 0, state: self.state, flows: None });
        }
        let flows = self.model.step(&mut self.state);
        self.day += 1;
        Some(DaySnapshot { day: self.day, state: self.state, flows: Some(flows) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() -> PopulationState {
        PopulationState { population: 100_000, active_infections: 75, susceptible: 99_925, recovered: 35, deaths: 5 }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn seed_splits_susceptible_by_vaccination() {
        let s = SirdState::seed(&init(), VaccinationRate::from_fraction(0.85).unwrap());
        assert!(approx(s.s_unvacc, 99_925.0 * 0.15));
        assert!(approx(s.s_vacc, 99_925.0 * 0.85));
        assert_eq!(s.i_unvacc, 75.0);
        assert_eq!(s.i_vacc, 0.0);
        assert_eq!(s.recovered, 35.0);
        assert_eq!(s.dead, 5.0);
    }

    #[test]
    fn first_step_matches_hand_computation() {
        let model = SirdModel::new(ModelParams::default(), 100_000).unwrap();
        let mut s = SirdState::seed(&init(), VaccinationRate::NONE);
        let f = model.step(&mut s);
        // 75 * 99925 / 100000
        assert!(approx(f.new_cases_unvacc, 74.94375));
        assert_eq!(f.new_cases_vacc, 0.0);
        // 75 / 15 * 0.01
        assert!(approx(f.new_deaths, 0.05));
        assert!(approx(s.i_unvacc, 75.0 + 74.94375 - 5.0));
        assert!(approx(s.recovered, 35.0 + 5.0 * 0.99));
    }

    #[test]
    fn vaccinated_infections_die_less() {
        let model = SirdModel::new(ModelParams::default(), 1_000).unwrap();
        let mut s = SirdState { s_unvacc: 0.0, s_vacc: 0.0, i_unvacc: 0.0, i_vacc: 150.0, recovered: 0.0, dead: 0.0 };
        let f = model.step(&mut s);
        // 150/15 * 0.01 * (1 - 0.98)
        assert!(approx(f.new_deaths, 0.002));
        assert!(approx(s.recovered, 10.0 * (1.0 - 0.01 + 0.01 * 0.98)));
    }

    #[test]
    fn oversized_flow_is_dropped() {
        // b * I / N > 1 means the computed infections exceed the pool
        let params = ModelParams { contact_rate: 5.0, ..Default::default() };
        let model = SirdModel::new(params, 100).unwrap();
        let mut s = SirdState { s_unvacc: 40.0, s_vacc: 0.0, i_unvacc: 60.0, i_vacc: 0.0, recovered: 0.0, dead: 0.0 };
        let f = model.step(&mut s);
        assert_eq!(f.new_cases_unvacc, 0.0);
        assert_eq!(s.s_unvacc, 40.0);
    }

    #[test]
    fn trajectory_and_advance_agree() {
        let model = SirdModel::new(ModelParams::default(), 100_000).unwrap();
        let seed = SirdState::seed(&init(), VaccinationRate::from_fraction(0.5).unwrap());

        let snaps: Vec<_> = model.trajectory(seed).take(11).collect();
        assert_eq!(snaps.len(), 11);
        assert_eq!(snaps[0].day, 0);
        assert!(snaps[0].flows.is_none());
        assert_eq!(snaps[10].day, 10);

        let mut s = seed;
        let last = model.advance(&mut s, 10).unwrap();
        assert_eq!(snaps[10].state, s);
        assert_eq!(snaps[10].flows, Some(last));
    }

    #[test]
    fn advance_zero_days_is_noop() {
        let model = SirdModel::new(ModelParams::default(), 100_000).unwrap();
        let seed = SirdState::seed(&init(), VaccinationRate::NONE);
        let mut s = seed;
        assert!(model.advance(&mut s, 0).is_none());
        assert_eq!(s, seed);
    }

    #[test]
    fn compartment_total_does_not_return_to_population() {
        let model = SirdModel::new(ModelParams::default(), 100_000).unwrap();
        let seed = SirdState::seed(&init(), VaccinationRate::from_fraction(0.85).unwrap());
        // S0 + I0 + R0 + D0 = (N - 75) + 75 + (40 - 5) + 5
        assert!(approx(seed.total(), 100_040.0));
        for snap in model.trajectory(seed).take(61) {
            assert!((snap.state.total() - 100_040.0).abs() < 1e-6, "day {}", snap.day);
            assert!(snap.state.total() > model.n);
        }
    }

    #[test]
    fn new_rejects_zero_population() {
        assert!(SirdModel::new(ModelParams::default(), 0).is_err());
    }
}
