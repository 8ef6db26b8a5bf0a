//! Shared application state and the API-key auth extractor.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gateway_core::{ApiKeyAuthenticator, Pipeline};

use crate::error::ApiError;

/// State shared across every route handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub authenticator: Arc<ApiKeyAuthenticator>,
}

/// The tenant a request authenticated as, resolved from the `X-API-Key` header.
///
/// Extracting this is the gateway's only authentication step; by the time a
/// handler runs, the tenant id is trusted and [`Pipeline::complete`] no longer
/// needs to re-check it.
pub struct AuthenticatedTenant(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let api_key = parts.headers.get("x-api-key").and_then(|v| v.to_str().ok());
        let tenant_id = state.authenticator.authenticate(api_key)?;
        Ok(Self(tenant_id))
    }
}
