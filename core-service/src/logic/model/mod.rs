//! Model Module - artifact loading and inference
//!
//! The classifier is an opaque capability behind the `Classifier` trait.
//! Bundles are loaded once and shared read-only.

pub mod bundle;
pub mod classifier;
pub mod inference;
pub mod pipeline;
pub mod threshold;

#[cfg(test)]
mod tests;

// Re-export common types
pub use bundle::{load, load_or_unavailable, ArtifactLoadError, ModelBundle};
pub use classifier::{Classifier, InferenceError};
pub use inference::{PredictError, PredictionResult};
pub use pipeline::{ClassifierSpec, LogisticPipeline};
pub use threshold::DecisionThreshold;
