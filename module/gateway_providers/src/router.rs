//! Ordered priority routing across provider adapters, with circuit-breaker skips
//! and fallback bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use gateway_reliability::CircuitBreaker;
use gateway_types::{AdapterResponse, CircuitBreakerState, CompletionRequest, Provider};
use serde::Serialize;

use crate::ProviderAdapter;

/// Point-in-time health of one configured provider, for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub configured: bool,
    pub circuit_state: CircuitBreakerState,
}

/// All upstream attempts failed (or none were eligible to try).
#[derive(Debug, Clone)]
pub struct GatewayError {
    pub message: String,
    pub provider_errors: HashMap<String, String>,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Bookkeeping about how a request was routed, attached to the audit trail.
#[derive(Debug, Clone, Default)]
pub struct RouteOutcome {
    pub first_tried: Option<Provider>,
    pub fallback_triggered: bool,
    pub fallback_reason: Option<String>,
}

/// Routes a [`CompletionRequest`] across configured adapters in priority order.
pub struct Router {
    adapters: Vec<Box<dyn ProviderAdapter>>,
    priority: Vec<Provider>,
    breaker: Arc<CircuitBreaker>,
}

impl Router {
    pub fn new(adapters: Vec<Box<dyn ProviderAdapter>>, priority: Vec<Provider>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { adapters, priority, breaker }
    }

    fn adapter_for(&self, provider: Provider) -> Option<&dyn ProviderAdapter> {
        self.adapters.iter().find(|a| a.name() == provider).map(|a| a.as_ref())
    }

    /// The first provider in priority order, used as the basis for a
    /// worst-case cost estimate before routing has happened.
    pub fn first_priority(&self) -> Provider {
        self.priority.first().copied().unwrap_or(Provider::Anthropic)
    }

    /// Health of every provider in priority order, for status endpoints.
    pub fn status(&self) -> Vec<ProviderStatus> {
        self.priority
            .iter()
            .map(|&provider| ProviderStatus {
                provider,
                configured: self.adapter_for(provider).map(|a| a.is_available()).unwrap_or(false),
                circuit_state: self.breaker.state_of(provider.as_str()),
            })
            .collect()
    }

    /// Builds the ordered candidate list: `request.provider` (if set) moved to
    /// the front of the configured priority list, duplicates removed.
    fn candidate_order(&self, preferred: Option<Provider>) -> Vec<Provider> {
        let mut order = Vec::with_capacity(self.priority.len());
        if let Some(p) = preferred {
            order.push(p);
        }
        for p in &self.priority {
            if !order.contains(p) {
                order.push(*p);
            }
        }
        order
    }

    /// Attempt the request against each eligible provider in order, falling back
    /// on failure. Providers that are unconfigured or whose circuit is open are
    /// skipped without counting as an attempt.
    pub async fn route(
        &self,
        request: &CompletionRequest,
    ) -> Result<(AdapterResponse, RouteOutcome), GatewayError> {
        let order = self.candidate_order(request.provider);
        let mut outcome = RouteOutcome::default();
        let mut provider_errors = HashMap::new();
        let mut prior_failure: Option<(Provider, String)> = None;

        for provider in order {
            let Some(adapter) = self.adapter_for(provider) else {
                tracing::debug!(provider = %provider, "skipping unconfigured provider");
                provider_errors.insert(provider.as_str().to_string(), "Not configured (missing API key)".to_string());
                continue;
            };
            if !adapter.is_available() {
                tracing::debug!(provider = %provider, "skipping unconfigured provider");
                provider_errors.insert(provider.as_str().to_string(), "Not configured (missing API key)".to_string());
                continue;
            }
            if self.breaker.is_open(provider.as_str()) {
                tracing::debug!(provider = %provider, "skipping provider, circuit open");
                provider_errors
                    .insert(provider.as_str().to_string(), "Circuit breaker open (too many recent failures)".to_string());
                continue;
            }

            if outcome.first_tried.is_none() {
                outcome.first_tried = Some(provider);
            }

            match adapter.complete(request).await {
                Ok(response) => {
                    self.breaker.record_success(provider.as_str());
                    if let Some((failed_provider, reason)) = prior_failure {
                        outcome.fallback_triggered = true;
                        outcome.fallback_reason =
                            Some(format!("{failed_provider} failed ({reason}), fell back to {provider}"));
                    }
                    return Ok((response, outcome));
                }
                Err(e) => {
                    self.breaker.record_failure(provider.as_str());
                    let msg = e.to_string();
                    provider_errors.insert(provider.as_str().to_string(), msg.clone());
                    prior_failure = Some((provider, msg));
                }
            }
        }

        Err(GatewayError {
            message: "all providers failed or were unavailable".to_string(),
            provider_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_types::{Error, Message, Result};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubAdapter {
        provider: Provider,
        available: bool,
        fails: bool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn name(&self) -> Provider {
            self.provider
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn default_model(&self) -> &str {
            "stub-model"
        }
        async fn complete(&self, _request: &CompletionRequest) -> Result<AdapterResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(Error::Provider(format!("{} is down", self.provider)))
            } else {
                Ok(AdapterResponse {
                    content: "hello".into(),
                    model_used: "stub-model".into(),
                    prompt_tokens: 5,
                    completion_tokens: 5,
                    provider: self.provider,
                })
            }
        }
    }

    fn req() -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message { role: "user".into(), content: "hi".into() }],
            model: None,
            provider: None,
            max_tokens: 100,
            temperature: 0.5,
            tenant_id: "acme".into(),
            stream: false,
        }
    }

    #[tokio::test]
    async fn routes_to_first_available_provider() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![Box::new(StubAdapter {
            provider: Provider::Anthropic,
            available: true,
            fails: false,
            calls: AtomicU32::new(0),
        })];
        let router = Router::new(adapters, vec![Provider::Anthropic], Arc::new(CircuitBreaker::default()));
        let (response, outcome) = router.route(&req()).await.unwrap();
        assert_eq!(response.provider, Provider::Anthropic);
        assert!(!outcome.fallback_triggered);
    }

    #[tokio::test]
    async fn falls_back_to_next_provider_on_failure() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(StubAdapter { provider: Provider::Anthropic, available: true, fails: true, calls: AtomicU32::new(0) }),
            Box::new(StubAdapter { provider: Provider::OpenAi, available: true, fails: false, calls: AtomicU32::new(0) }),
        ];
        let router =
            Router::new(adapters, vec![Provider::Anthropic, Provider::OpenAi], Arc::new(CircuitBreaker::default()));
        let (response, outcome) = router.route(&req()).await.unwrap();
        assert_eq!(response.provider, Provider::OpenAi);
        assert!(outcome.fallback_triggered);
        assert_eq!(outcome.first_tried, Some(Provider::Anthropic));
        assert!(outcome.fallback_reason.unwrap().contains("anthropic"));
    }

    #[tokio::test]
    async fn unconfigured_providers_are_skipped_without_counting_as_attempts() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(StubAdapter { provider: Provider::Anthropic, available: false, fails: false, calls: AtomicU32::new(0) }),
            Box::new(StubAdapter { provider: Provider::OpenAi, available: true, fails: false, calls: AtomicU32::new(0) }),
        ];
        let router =
            Router::new(adapters, vec![Provider::Anthropic, Provider::OpenAi], Arc::new(CircuitBreaker::default()));
        let (response, outcome) = router.route(&req()).await.unwrap();
        assert_eq!(response.provider, Provider::OpenAi);
        assert_eq!(outcome.first_tried, Some(Provider::OpenAi));
        assert!(!outcome.fallback_triggered);
    }

    #[tokio::test]
    async fn preferred_provider_is_tried_first() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(StubAdapter { provider: Provider::Anthropic, available: true, fails: false, calls: AtomicU32::new(0) }),
            Box::new(StubAdapter { provider: Provider::OpenAi, available: true, fails: false, calls: AtomicU32::new(0) }),
        ];
        let router =
            Router::new(adapters, vec![Provider::Anthropic, Provider::OpenAi], Arc::new(CircuitBreaker::default()));
        let mut request = req();
        request.provider = Some(Provider::OpenAi);
        let (response, _) = router.route(&request).await.unwrap();
        assert_eq!(response.provider, Provider::OpenAi);
    }

    #[tokio::test]
    async fn all_providers_failing_surfaces_gateway_error() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![Box::new(StubAdapter {
            provider: Provider::Anthropic,
            available: true,
            fails: true,
            calls: AtomicU32::new(0),
        })];
        let router = Router::new(adapters, vec![Provider::Anthropic], Arc::new(CircuitBreaker::default()));
        let err = router.route(&req()).await.unwrap_err();
        assert!(err.provider_errors.contains_key("anthropic"));
    }

    #[tokio::test]
    async fn unconfigured_providers_are_reported_in_the_error_map() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![Box::new(StubAdapter {
            provider: Provider::Anthropic,
            available: false,
            fails: false,
            calls: AtomicU32::new(0),
        })];
        let router = Router::new(adapters, vec![Provider::Anthropic, Provider::OpenAi], Arc::new(CircuitBreaker::default()));
        let err = router.route(&req()).await.unwrap_err();
        assert_eq!(err.provider_errors.get("anthropic").unwrap(), "Not configured (missing API key)");
        assert_eq!(err.provider_errors.get("openai").unwrap(), "Not configured (missing API key)");
    }

    #[tokio::test]
    async fn open_breaker_is_reported_in_the_error_map() {
        let breaker = Arc::new(CircuitBreaker::new(1, 60));
        breaker.record_failure("anthropic");
        let adapters: Vec<Box<dyn ProviderAdapter>> =
            vec![Box::new(StubAdapter { provider: Provider::Anthropic, available: true, fails: false, calls: AtomicU32::new(0) })];
        let router = Router::new(adapters, vec![Provider::Anthropic], breaker);
        let err = router.route(&req()).await.unwrap_err();
        assert_eq!(err.provider_errors.get("anthropic").unwrap(), "Circuit breaker open (too many recent failures)");
    }

    #[tokio::test]
    async fn open_circuit_skips_provider() {
        let breaker = Arc::new(CircuitBreaker::new(1, 60));
        breaker.record_failure("anthropic"); // trips after 1 failure
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(StubAdapter { provider: Provider::Anthropic, available: true, fails: false, calls: AtomicU32::new(0) }),
            Box::new(StubAdapter { provider: Provider::OpenAi, available: true, fails: false, calls: AtomicU32::new(0) }),
        ];
        let router = Router::new(adapters, vec![Provider::Anthropic, Provider::OpenAi], breaker);
        let (response, outcome) = router.route(&req()).await.unwrap();
        assert_eq!(response.provider, Provider::OpenAi);
        assert_eq!(outcome.first_tried, Some(Provider::OpenAi));
    }
}
