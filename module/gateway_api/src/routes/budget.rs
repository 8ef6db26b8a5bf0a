//! `GET /v1/budget` - per-tenant budget usage, for the operator dashboard.

use axum::extract::State;
use axum::Json;
use gateway_types::TenantBudget;

use crate::state::AppState;

pub async fn list_budgets(State(state): State<AppState>) -> Json<Vec<TenantBudget>> {
    Json(state.pipeline.budget_snapshot())
}
