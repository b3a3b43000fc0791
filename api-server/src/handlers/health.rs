//! Health check handlers

use axum::{extract::State, Json};

use crate::models::{HealthResponse, HomeResponse};
use crate::AppState;

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Titanic API OK".to_string(),
    })
}

/// Liveness plus model readiness
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.bundle.is_loaded(),
    })
}
