//! The request pipeline: the fixed sequence every completion request goes
//! through, in order, with no stage skipped or reordered.
//!
//! ```text
//! Redact -> EstimateCost (worst case) -> BudgetCheck -> Route (+breaker)
//!   -> RecordUsage (actual cost) -> Audit (always, exactly once) -> Respond
//! ```
//!
//! Authentication happens one layer up, in `gateway_api`, since it's tied to
//! the transport (an HTTP header) rather than to request semantics; by the
//! time a [`gateway_types::CompletionRequest`] reaches [`Pipeline::complete`]
//! its `tenant_id` is already resolved and trusted.

use std::time::Instant;

use chrono::Utc;
use gateway_audit::AuditLogger;
use gateway_cost::{PricingManager, TenantBudgetManager};
use gateway_providers::estimate_tokens;
use gateway_providers::router::Router;
use gateway_safety::PiiDetector;
use gateway_types::{
    AuditEntry, CompletionRequest, CompletionResponse, Error, Message, RedactionResult, RequestId,
    RequestStatus, Result, TokenUsage,
};

/// Ties together safety, cost, routing and audit into the gateway's single
/// request path.
pub struct Pipeline {
    detector: PiiDetector,
    pricing: PricingManager,
    budgets: TenantBudgetManager,
    router: Router,
    audit: AuditLogger,
}

impl Pipeline {
    pub fn new(
        detector: PiiDetector,
        pricing: PricingManager,
        budgets: TenantBudgetManager,
        router: Router,
        audit: AuditLogger,
    ) -> Self {
        Self { detector, pricing, budgets, router, audit }
    }

    /// Runs a single completion request through the full pipeline.
    pub async fn complete(&self, request_id: RequestId, mut request: CompletionRequest) -> Result<CompletionResponse> {
        let started = Instant::now();
        request.validate()?;

        let pii = redact_messages(&self.detector, &mut request.messages);

        // Worst-case pre-check: the true completion token count is unknown
        // until the provider responds, so use the caller's max_tokens ceiling
        // against the provider/model the router will try first.
        let (estimate_provider, estimate_model) = self.pre_route_estimate(&request);
        let estimated_prompt_tokens = estimate_tokens(&joined_prompt(&request.messages));
        let worst_case_cost =
            self.pricing.estimate_cost(estimate_provider.as_str(), &estimate_model, estimated_prompt_tokens, request.max_tokens);

        if let Err(cost_err) = self.budgets.check(&request.tenant_id, worst_case_cost) {
            let latency_ms = started.elapsed().as_millis() as u64;
            self.record_audit(AuditEntry {
                timestamp: Utc::now(),
                request_id: request_id.to_string(),
                tenant_id: request.tenant_id.clone(),
                provider_requested: request.provider,
                provider_used: None,
                model_used: request.model.clone(),
                prompt_tokens: estimated_prompt_tokens,
                completion_tokens: 0,
                estimated_cost_usd: worst_case_cost,
                pii_entities_redacted: pii.entities_found.clone(),
                pii_redaction_count: pii.redaction_count,
                latency_ms,
                fallback_triggered: false,
                fallback_reason: None,
                status: RequestStatus::BudgetExceeded,
                error_message: Some(cost_err.to_string()),
            })
            .await;
            return Err(Error::BudgetExceeded(cost_err.to_string()));
        }

        match self.router.route(&request).await {
            Ok((response, outcome)) => {
                let actual_cost = self.pricing.estimate_cost(
                    response.provider.as_str(),
                    &response.model_used,
                    response.prompt_tokens,
                    response.completion_tokens,
                );
                self.budgets.record(&request.tenant_id, actual_cost);
                let latency_ms = started.elapsed().as_millis() as u64;

                self.record_audit(AuditEntry {
                    timestamp: Utc::now(),
                    request_id: request_id.to_string(),
                    tenant_id: request.tenant_id.clone(),
                    provider_requested: request.provider,
                    provider_used: Some(response.provider),
                    model_used: Some(response.model_used.clone()),
                    prompt_tokens: response.prompt_tokens,
                    completion_tokens: response.completion_tokens,
                    estimated_cost_usd: actual_cost,
                    pii_entities_redacted: pii.entities_found.clone(),
                    pii_redaction_count: pii.redaction_count,
                    latency_ms,
                    fallback_triggered: outcome.fallback_triggered,
                    fallback_reason: outcome.fallback_reason.clone(),
                    status: RequestStatus::Success,
                    error_message: None,
                })
                .await;

                Ok(CompletionResponse {
                    id: request_id.to_string(),
                    provider_used: response.provider,
                    model_used: response.model_used,
                    content: response.content,
                    usage: TokenUsage {
                        prompt_tokens: response.prompt_tokens,
                        completion_tokens: response.completion_tokens,
                        total_tokens: response.prompt_tokens + response.completion_tokens,
                        estimated_cost_usd: actual_cost,
                    },
                    pii_summary: pii,
                    latency_ms,
                    fallback_triggered: outcome.fallback_triggered,
                    fallback_reason: outcome.fallback_reason,
                    timestamp: Utc::now(),
                })
            }
            Err(route_err) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                let message = route_err.to_string();
                self.record_audit(AuditEntry {
                    timestamp: Utc::now(),
                    request_id: request_id.to_string(),
                    tenant_id: request.tenant_id.clone(),
                    provider_requested: request.provider,
                    provider_used: None,
                    model_used: request.model.clone(),
                    prompt_tokens: estimated_prompt_tokens,
                    completion_tokens: 0,
                    estimated_cost_usd: 0.0,
                    pii_entities_redacted: pii.entities_found.clone(),
                    pii_redaction_count: pii.redaction_count,
                    latency_ms,
                    fallback_triggered: false,
                    fallback_reason: None,
                    status: RequestStatus::Error,
                    error_message: Some(message.clone()),
                })
                .await;
                Err(Error::AllProvidersFailed { message, provider_errors: route_err.provider_errors })
            }
        }
    }

    /// Picks the provider/model pair to price the worst-case pre-check
    /// against: the caller's explicit choice if given, otherwise the first
    /// entry in the router's priority list.
    fn pre_route_estimate(&self, request: &CompletionRequest) -> (gateway_types::Provider, String) {
        let provider = request.provider.unwrap_or_else(|| self.router.first_priority());
        let model = request.model.clone().unwrap_or_else(|| "default".to_string());
        (provider, model)
    }

    async fn record_audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.log(entry).await {
            tracing::error!(error = %e, "failed to write audit log entry");
        }
    }

    /// Current budget window for every tenant that has made a request.
    pub fn budget_snapshot(&self) -> Vec<gateway_types::TenantBudget> {
        self.budgets.all_tenants()
    }

    /// Health of every configured provider.
    pub fn provider_status(&self) -> Vec<gateway_providers::router::ProviderStatus> {
        self.router.status()
    }

    /// The most recent audit entries, newest first.
    pub fn recent_audit(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.audit.recent(limit)
    }
}

fn joined_prompt(messages: &[Message]) -> String {
    messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n")
}

/// Redacts PII from every message in place, returning a summary of what was found.
fn redact_messages(detector: &PiiDetector, messages: &mut [Message]) -> RedactionResult {
    let mut summary = RedactionResult::default();
    for message in messages.iter_mut() {
        let result = detector.redact(&message.content);
        if result.redacted {
            message.content = result.redacted_text;
            for entity in result.entities_found {
                if !summary.entities_found.contains(&entity) {
                    summary.entities_found.push(entity);
                }
            }
            summary.redaction_count += result.redaction_count;
        }
    }
    summary.redacted = summary.redaction_count > 0;
    summary
}
