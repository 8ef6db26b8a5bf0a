//! `GET /v1/providers/status` - per-provider availability and circuit state.

use axum::extract::State;
use axum::Json;
use gateway_core::ProviderStatus;

use crate::state::AppState;

pub async fn provider_status(State(state): State<AppState>) -> Json<Vec<ProviderStatus>> {
    Json(state.pipeline.provider_status())
}
