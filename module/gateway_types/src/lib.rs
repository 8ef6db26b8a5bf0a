//! Shared domain types for the LLM gateway
//!
//! This crate provides the foundational types used across all gateway modules:
//! the request/response wire model, tenant budget and audit records, and the
//! common error type threaded through the pipeline. All types are feature-gated
//! behind the `enabled` feature.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
pub mod ids;

#[cfg(feature = "enabled")]
pub use ids::{IdError, ProviderId, RequestId, TenantId};

#[cfg(feature = "enabled")]
mod types {
    use std::collections::HashMap;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// Upstream LLM providers the gateway knows how to route to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Provider {
        Anthropic,
        OpenAi,
        AzureOpenAi,
        Gemini,
    }

    impl Provider {
        /// Canonical lowercase name, as used in config, audit records and the wire API.
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Anthropic => "anthropic",
                Self::OpenAi => "openai",
                Self::AzureOpenAi => "azure_openai",
                Self::Gemini => "gemini",
            }
        }

        /// Parse a provider name back from its canonical string form.
        pub fn parse(s: &str) -> Option<Self> {
            match s {
                "anthropic" => Some(Self::Anthropic),
                "openai" => Some(Self::OpenAi),
                "azure_openai" => Some(Self::AzureOpenAi),
                "gemini" => Some(Self::Gemini),
                _ => None,
            }
        }
    }

    impl std::fmt::Display for Provider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    /// A single chat message in a completion request.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Message {
        pub role: String,
        pub content: String,
    }

    /// Inbound completion request, as submitted by a tenant.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CompletionRequest {
        pub messages: Vec<Message>,
        #[serde(default)]
        pub model: Option<String>,
        #[serde(default)]
        pub provider: Option<Provider>,
        #[serde(default = "default_max_tokens")]
        pub max_tokens: u32,
        #[serde(default = "default_temperature")]
        pub temperature: f64,
        #[serde(default = "default_tenant_id")]
        pub tenant_id: String,
        #[serde(default)]
        pub stream: bool,
    }

    fn default_max_tokens() -> u32 {
        1024
    }

    fn default_temperature() -> f64 {
        0.7
    }

    fn default_tenant_id() -> String {
        "default".to_string()
    }

    impl CompletionRequest {
        /// `max_tokens` must be in `1..=8192`, `temperature` in `0.0..=2.0`.
        pub fn validate(&self) -> Result<(), Error> {
            if self.messages.is_empty() {
                return Err(Error::Validation("messages must not be empty".into()));
            }
            if !(1..=8192).contains(&self.max_tokens) {
                return Err(Error::Validation(format!(
                    "max_tokens must be between 1 and 8192, got {}",
                    self.max_tokens
                )));
            }
            if !(0.0..=2.0).contains(&self.temperature) {
                return Err(Error::Validation(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    self.temperature
                )));
            }
            Ok(())
        }
    }

    /// Raw response from a provider adapter, before cost/audit bookkeeping.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AdapterResponse {
        pub content: String,
        pub model_used: String,
        pub prompt_tokens: u32,
        pub completion_tokens: u32,
        pub provider: Provider,
    }

    /// Token accounting and derived cost for a completed request.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TokenUsage {
        pub prompt_tokens: u32,
        pub completion_tokens: u32,
        pub total_tokens: u32,
        pub estimated_cost_usd: f64,
    }

    /// Outcome of redacting one piece of text.
    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct RedactionResult {
        pub redacted_text: String,
        pub redacted: bool,
        pub entities_found: Vec<String>,
        pub redaction_count: usize,
    }

    /// Full response handed back to the tenant.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CompletionResponse {
        pub id: String,
        pub provider_used: Provider,
        pub model_used: String,
        pub content: String,
        pub usage: TokenUsage,
        pub pii_summary: RedactionResult,
        pub latency_ms: u64,
        pub fallback_triggered: bool,
        pub fallback_reason: Option<String>,
        pub timestamp: DateTime<Utc>,
    }

    /// Snapshot of a tenant's daily/monthly budget window.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TenantBudget {
        pub tenant_id: String,
        pub daily_limit_usd: f64,
        pub monthly_limit_usd: f64,
        pub daily_used_usd: f64,
        pub monthly_used_usd: f64,
        pub daily_remaining_usd: f64,
        pub monthly_remaining_usd: f64,
        pub request_count_today: u64,
        pub request_count_month: u64,
        pub last_updated: DateTime<Utc>,
    }

    /// Outcome of a pipeline run, for the audit record's `status` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestStatus {
        Success,
        Error,
        BudgetExceeded,
    }

    /// One append-only audit log entry. Never carries prompt/completion content.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AuditEntry {
        pub timestamp: DateTime<Utc>,
        pub request_id: String,
        pub tenant_id: String,
        pub provider_requested: Option<Provider>,
        pub provider_used: Option<Provider>,
        pub model_used: Option<String>,
        pub prompt_tokens: u32,
        pub completion_tokens: u32,
        pub estimated_cost_usd: f64,
        pub pii_entities_redacted: Vec<String>,
        pub pii_redaction_count: usize,
        pub latency_ms: u64,
        pub fallback_triggered: bool,
        pub fallback_reason: Option<String>,
        pub status: RequestStatus,
        pub error_message: Option<String>,
    }

    /// Circuit breaker state for a single provider, as surfaced to operators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CircuitBreakerState {
        Closed,
        Open,
        HalfOpen,
    }

    /// Main configuration for the gateway runtime.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Config {
        pub safety: SafetyConfig,
        pub cost: CostConfig,
        pub reliability: ReliabilityConfig,
        pub providers: ProvidersConfig,
        pub audit: AuditConfig,
    }

    /// Safety module configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SafetyConfig {
        #[serde(default = "default_true")]
        pub pii_redaction_enabled: bool,
        #[serde(default)]
        pub rich_detection: bool,
        #[serde(default)]
        pub entities: Vec<String>,
    }

    fn default_true() -> bool {
        true
    }

    /// Cost module configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CostConfig {
        pub default_daily_budget_usd: f64,
        pub default_monthly_budget_usd: f64,
    }

    /// Reliability module configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReliabilityConfig {
        pub failure_threshold: u32,
        pub cooldown_seconds: u64,
    }

    /// Provider routing configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProvidersConfig {
        pub priority: Vec<Provider>,
    }

    /// Audit logging configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AuditConfig {
        pub log_path: String,
        #[serde(default)]
        pub siem_webhook_url: Option<String>,
    }

    /// Common error type threaded through the pipeline.
    #[derive(Debug, Error)]
    pub enum Error {
        #[error("unauthorized: {0}")]
        Unauthorized(String),

        #[error("forbidden: {0}")]
        Forbidden(String),

        #[error("invalid request: {0}")]
        Validation(String),

        #[error("budget exceeded: {0}")]
        BudgetExceeded(String),

        #[error("circuit breaker open: {0}")]
        CircuitBreakerOpen(String),

        #[error("all providers failed: {message}")]
        AllProvidersFailed { message: String, provider_errors: HashMap<String, String> },

        #[error("safety violation: {0}")]
        Safety(String),

        #[error("configuration error: {0}")]
        Config(String),

        #[error("upstream provider error: {0}")]
        Provider(String),

        #[error("io error: {0}")]
        Io(String),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

#[cfg(feature = "enabled")]
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_rejects_empty_messages() {
        let req = CompletionRequest {
            messages: vec![],
            model: None,
            provider: None,
            max_tokens: 100,
            temperature: 0.5,
            tenant_id: "acme".into(),
            stream: false,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn completion_request_rejects_out_of_range_max_tokens() {
        let req = CompletionRequest {
            messages: vec![Message { role: "user".into(), content: "hi".into() }],
            model: None,
            provider: None,
            max_tokens: 9000,
            temperature: 0.5,
            tenant_id: "acme".into(),
            stream: false,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn provider_round_trips_through_canonical_string() {
        for p in [Provider::Anthropic, Provider::OpenAi, Provider::AzureOpenAi, Provider::Gemini] {
            assert_eq!(Provider::parse(p.as_str()), Some(p));
        }
    }
}
