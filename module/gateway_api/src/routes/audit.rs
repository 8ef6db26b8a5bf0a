//! `GET /v1/audit/recent` - most recent audit log entries.

use axum::extract::{Query, State};
use axum::Json;
use gateway_types::AuditEntry;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let entries = state.pipeline.recent_audit(query.limit).map_err(ApiError::from)?;
    Ok(Json(entries))
}
