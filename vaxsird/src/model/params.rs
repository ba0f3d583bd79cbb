use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Fixed biological and behavioural constants of the vaccinated/unvaccinated SIRD model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub infectious_days: usize,             // k, days a case stays infectious
    pub contact_rate: f64,                  // b, effective contacts per infectious person per day
    pub fatality_rate: f64,                 // delta, among unvaccinated cases
    pub vaccine_infection_reduction: f64,   // x, relative drop in susceptibility when vaccinated
    pub vaccine_death_reduction: f64,       // y, relative drop in fatality when vaccinated
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            infectious_days: 15,
            contact_rate: 1.0,
            fatality_rate: 0.01,
            vaccine_infection_reduction: 0.98,
            vaccine_death_reduction: 0.98,
        }
    }
}

impl ModelParams {
    /// Daily fraction of the infectious pool that recovers or dies (a = 1/k).
    pub fn exit_rate(&self) -> f64 {
        1.0 / self.infectious_days as f64
    }

    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.infectious_days >= 1, "infectious_days must be >= 1");
        anyhow::ensure!(
            self.contact_rate.is_finite() && self.contact_rate >= 0.0,
            "contact_rate must be finite and >= 0"
        );
        for (name, v) in [
            ("fatality_rate", self.fatality_rate),
            ("vaccine_infection_reduction", self.vaccine_infection_reduction),
            ("vaccine_death_reduction", self.vaccine_death_reduction),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&v), "{} must be in [0, 1] (got {})", name, v);
        }
        Ok(())
    }

    /// Load parameters from a JSON file. Missing fields fall back to the defaults.
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading model params {}", path.display()))?;
        let params: ModelParams = serde_json::from_str(&raw)
            .with_context(|| format!("parsing model params {}", path.display()))?;
        params.check()?;
        Ok(params)
    }
}
