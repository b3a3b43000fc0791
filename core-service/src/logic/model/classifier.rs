//! Classifier capability
//!
//! The service never depends on a concrete model type, only on this one
//! operation. Swap the implementation, mock it in tests.

use std::fmt::Debug;

use crate::logic::features::FeatureRow;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct InferenceError(pub String);

/// Trait for fitted binary classifiers
///
/// Implementations hold only fitted, immutable parameters, so one instance
/// can serve concurrent requests through `&self`.
pub trait Classifier: Debug + Send + Sync {
    /// Probability mass assigned to the positive (survived) class
    fn predict_proba(&self, row: &FeatureRow) -> Result<f64, InferenceError>;

    /// Short human-readable model kind, for logs
    fn kind(&self) -> &str;
}
