use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub system_info: SystemInfo,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/healthcheck", get(healthcheck))
}

pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available",
        system_info: SystemInfo {
            environment: state.config.environment.clone(),
            version: state.config.version.clone(),
        },
    })
}
