//! Titanic Survival Core
//!
//! Passenger schema, model bundle and prediction, plus the offline
//! monitoring tools (drift, evaluation, smoke client) built on them.

pub mod constants;
pub mod logic;

pub use logic::model::{
    load, load_or_unavailable, ArtifactLoadError, DecisionThreshold, ModelBundle, PredictError,
    PredictionResult,
};
pub use logic::passenger::{Passenger, SchemaViolation};
