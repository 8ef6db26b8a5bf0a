//! `POST /v1/complete` - the gateway's single inference entry point.

use axum::extract::State;
use axum::Json;
use gateway_types::{CompletionRequest, CompletionResponse, RequestId};

use crate::error::ApiError;
use crate::state::{AppState, AuthenticatedTenant};

pub async fn complete(
    State(state): State<AppState>,
    AuthenticatedTenant(tenant_id): AuthenticatedTenant,
    Json(mut request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    // The authenticated key's tenant always wins over whatever the body claims.
    request.tenant_id = tenant_id;
    let response = state.pipeline.complete(RequestId::generate(), request).await?;
    Ok(Json(response))
}
