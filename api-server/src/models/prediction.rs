//! Prediction models

use serde::{Deserialize, Serialize};
use validator::Validate;

use titanic_core::{DecisionThreshold, PredictionResult, SchemaViolation};

use crate::error::AppError;

/// Query string of POST /predict
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PredictParams {
    /// Per-request decision threshold
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub confidence: Option<f64>,
}

impl PredictParams {
    /// Validated override, `None` when absent
    pub fn threshold(&self) -> Result<Option<DecisionThreshold>, AppError> {
        self.validate()
            .map_err(|e| AppError::ValidationError(SchemaViolation::from(e).to_string()))?;

        // NaN slips through the range check
        self.confidence
            .map(DecisionThreshold::new)
            .transpose()
            .map_err(|e| AppError::ValidationError(format!("confidence: {}", e)))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub survived: u8,
    pub probability: f64,
    pub threshold_used: f64,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            survived: result.label,
            probability: result.probability,
            threshold_used: result.threshold,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
}
