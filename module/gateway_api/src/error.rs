//! Consistent JSON error responses.
//!
//! Every error the API returns, whatever stage of the pipeline it came from,
//! takes the same shape: `{"error": "...", "code": "..."}`.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use gateway_types::Error;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_errors: Option<HashMap<String, String>>,
}

/// Wraps [`gateway_types::Error`] so it can be returned directly from a handler.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            Error::BudgetExceeded(_) => (StatusCode::TOO_MANY_REQUESTS, "BUDGET_EXCEEDED"),
            Error::CircuitBreakerOpen(_) => (StatusCode::SERVICE_UNAVAILABLE, "CIRCUIT_BREAKER_OPEN"),
            Error::AllProvidersFailed { .. } => (StatusCode::BAD_GATEWAY, "ALL_PROVIDERS_FAILED"),
            Error::Safety(_) => (StatusCode::BAD_REQUEST, "SAFETY"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG"),
            Error::Provider(_) => (StatusCode::BAD_GATEWAY, "PROVIDER"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO"),
        };
        let provider_errors = match &self.0 {
            Error::AllProvidersFailed { provider_errors, .. } => Some(provider_errors.clone()),
            _ => None,
        };
        (status, Json(ErrorResponse { error: self.0.to_string(), code, provider_errors })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn budget_exceeded_maps_to_429() {
        let response = ApiError(Error::BudgetExceeded("over limit".into())).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = ApiError(Error::Unauthorized("missing key".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let response = ApiError(Error::Forbidden("bad key".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn all_providers_failed_maps_to_502_with_provider_error_map() {
        let mut provider_errors = HashMap::new();
        provider_errors.insert("anthropic".to_string(), "Not configured (missing API key)".to_string());
        let error = Error::AllProvidersFailed { message: "all providers failed".into(), provider_errors };
        let response = ApiError(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
