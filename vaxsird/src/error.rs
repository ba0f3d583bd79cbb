use std::fmt;

use serde::Serialize;

/// Errors surfaced by the projection engine.
#[derive(thiserror::Error, Debug)]
pub enum ProjectionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Only produced when the caller asks for strict projections.
    #[error("model divergence: {}", join_divergences(.0))]
    Divergence(Vec<Divergence>),
}

pub type EngineResult<T> = Result<T, ProjectionError>;

impl ProjectionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Physically invalid day-0 states the model still computes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Divergence {
    /// Recent cases exceed the stated population.
    NegativeSusceptible { susceptible: i64 },
    /// Cumulative deaths exceed cases older than the infectious window.
    NegativeRecoveries { recovered: i64 },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divergence::NegativeSusceptible { susceptible } => {
                write!(f, "susceptible pool is negative ({susceptible})")
            }
            Divergence::NegativeRecoveries { recovered } => {
                write!(f, "cumulative recoveries are negative ({recovered})")
            }
        }
    }
}

fn join_divergences(items: &[Divergence]) -> String {
    items.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
}
