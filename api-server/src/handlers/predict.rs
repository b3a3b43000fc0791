//! Prediction handler

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};

use titanic_core::Passenger;

use crate::models::{PredictParams, PredictResponse};
use crate::{AppError, AppResult, AppState};

/// Score one passenger
///
/// Extractor rejections are folded into 400 responses with the JSON error
/// body instead of axum's plain-text 422.
pub async fn predict(
    State(state): State<AppState>,
    params: Result<Query<PredictParams>, QueryRejection>,
    payload: Result<Json<Passenger>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Query(params) = params.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let Json(passenger) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let confidence = params.threshold()?;
    let result = state.bundle.predict(&passenger, confidence)?;

    Ok(Json(result.into()))
}
