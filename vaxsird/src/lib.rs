pub mod error;
pub mod io;
pub mod math;
pub mod model;
pub mod projection;

pub use error::{Divergence, EngineResult, ProjectionError};
pub use model::estimator::PopulationState;
pub use model::params::ModelParams;
pub use model::sird::{DaySnapshot, SirdModel, SirdState, StepFlows};
pub use model::vaccination::VaccinationRate;
pub use projection::{run_projection, Projection, ProjectionRequest, ProjectionResult, Projector};
