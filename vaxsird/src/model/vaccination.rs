use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ProjectionError};

/// Fraction of the population that is fully vaccinated, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct VaccinationRate(f64);

impl VaccinationRate {
    pub const NONE: VaccinationRate = VaccinationRate(0.0);

    pub fn from_fraction(v: f64) -> EngineResult<Self> {
        if !(0.0..=1.0).contains(&v) {
            return Err(ProjectionError::invalid(format!(
                "vaccination rate must be in [0, 1], got {v}"
            )));
        }
        Ok(Self(v))
    }

    /// Percentages (0..=100) are what dashboards collect from users.
    pub fn from_percent(p: f64) -> EngineResult<Self> {
        if !(0.0..=100.0).contains(&p) {
            return Err(ProjectionError::invalid(format!(
                "vaccination percentage must be in [0, 100], got {p}"
            )));
        }
        Ok(Self(p / 100.0))
    }

    pub fn fraction(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for VaccinationRate {
    type Error = ProjectionError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::from_fraction(v)
    }
}

impl From<VaccinationRate> for f64 {
    fn from(v: VaccinationRate) -> f64 {
        v.0
    }
}
