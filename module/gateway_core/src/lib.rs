//! Orchestration layer for the LLM gateway.
//!
//! Wires [`gateway_safety`], [`gateway_cost`], [`gateway_providers`] and
//! [`gateway_audit`] into the single request [`pipeline::Pipeline`] every
//! completion request runs through, plus the ambient configuration and
//! authentication every deployment needs regardless of which features are on.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
pub mod auth;
#[cfg(feature = "enabled")]
pub mod config;
#[cfg(feature = "enabled")]
pub mod pipeline;

#[cfg(feature = "enabled")]
pub use auth::ApiKeyAuthenticator;
#[cfg(feature = "enabled")]
pub use config::{default_api_keys, load_config, ProviderCredentials};
#[cfg(feature = "enabled")]
pub use gateway_providers::router::ProviderStatus;
#[cfg(feature = "enabled")]
pub use pipeline::Pipeline;
