//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use titanic_core::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed body or query, or a field outside its domain
    #[error("{0}")]
    ValidationError(String),

    /// Feature assembly or inference failed
    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Model not loaded")]
    ModelUnavailable,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::PredictionError(_) => StatusCode::BAD_REQUEST,
            AppError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::ModelUnavailable => tracing::error!("Prediction requested without a model"),
            AppError::PredictionError(msg) => tracing::warn!("Prediction failed: {}", msg),
            AppError::ValidationError(msg) => tracing::debug!("Rejected request: {}", msg),
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::SchemaViolation(v) => AppError::ValidationError(v.to_string()),
            PredictError::ModelUnavailable => AppError::ModelUnavailable,
            PredictError::BadInput(msg) => AppError::PredictionError(msg),
        }
    }
}
