//! HTTP surface for the LLM gateway.
//!
//! # Endpoints
//!
//! - `POST /v1/complete` - run a completion request through the pipeline
//! - `GET /v1/providers/status` - per-provider availability and circuit state
//! - `GET /v1/budget` - per-tenant budget usage
//! - `GET /v1/audit/recent?limit=N` - most recent audit entries
//! - `GET /health` - liveness probe
//!
//! Authentication is a single `X-API-Key` header, resolved to a tenant id by
//! [`state::AuthenticatedTenant`]. Everything past that extractor runs with an
//! already-authenticated, trusted tenant id.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
pub mod error;
#[cfg(feature = "enabled")]
pub mod routes;
#[cfg(feature = "enabled")]
pub mod state;

#[cfg(feature = "enabled")]
mod implementation {
    use axum::routing::{get, post};
    use axum::Router;
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    use crate::routes::{audit, budget, complete, health, providers};
    use crate::state::AppState;

    /// Builds the full gateway router. Callers attach a listener and serve it.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health::health))
            .route("/v1/complete", post(complete::complete))
            .route("/v1/providers/status", get(providers::provider_status))
            .route("/v1/budget", get(budget::list_budgets))
            .route("/v1/audit/recent", get(audit::recent))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "enabled")]
pub use implementation::router;
#[cfg(feature = "enabled")]
pub use state::AppState;
