pub mod estimator;
pub mod params;
pub mod sird;
pub mod vaccination;
