//! `GET /health` - liveness probe for load balancers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers_available: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers_available = state.pipeline.provider_status().iter().filter(|p| p.configured).count();
    Json(HealthResponse { status: "healthy", providers_available })
}
