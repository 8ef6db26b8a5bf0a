//! LLM model pricing and cost estimation.
//!
//! Rates are per 1,000 tokens, matching the provider billing model this gateway
//! estimates against. Pricing data is embedded at build time and can be reloaded
//! at runtime (e.g. from an operator-supplied JSON document) without downtime.

use std::collections::HashMap;
use std::sync::Arc;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

const PRICING_JSON: &str = r#"{
  "anthropic:claude-opus-4-6": { "input_cost_per_1k": 0.015, "output_cost_per_1k": 0.075 },
  "anthropic:claude-sonnet-4-6": { "input_cost_per_1k": 0.003, "output_cost_per_1k": 0.015 },
  "anthropic:claude-haiku-4-5": { "input_cost_per_1k": 0.00025, "output_cost_per_1k": 0.00125 },
  "anthropic:default": { "input_cost_per_1k": 0.003, "output_cost_per_1k": 0.015 },
  "openai:gpt-4o": { "input_cost_per_1k": 0.005, "output_cost_per_1k": 0.015 },
  "openai:gpt-4o-mini": { "input_cost_per_1k": 0.00015, "output_cost_per_1k": 0.0006 },
  "openai:gpt-4-turbo": { "input_cost_per_1k": 0.010, "output_cost_per_1k": 0.030 },
  "openai:default": { "input_cost_per_1k": 0.005, "output_cost_per_1k": 0.015 },
  "azure_openai:gpt-4o": { "input_cost_per_1k": 0.005, "output_cost_per_1k": 0.015 },
  "azure_openai:default": { "input_cost_per_1k": 0.005, "output_cost_per_1k": 0.015 },
  "gemini:gemini-1.5-pro": { "input_cost_per_1k": 0.00125, "output_cost_per_1k": 0.005 },
  "gemini:gemini-1.5-flash": { "input_cost_per_1k": 0.000075, "output_cost_per_1k": 0.0003 },
  "gemini:default": { "input_cost_per_1k": 0.000075, "output_cost_per_1k": 0.0003 }
}"#;

/// Per-1k-token pricing for a single `provider:model` entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Rate {
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl Rate {
    /// `prompt_tokens / 1000 * input_rate + completion_tokens / 1000 * output_rate`
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (f64::from(prompt_tokens) / 1000.0) * self.input_cost_per_1k
            + (f64::from(completion_tokens) / 1000.0) * self.output_cost_per_1k
    }
}

/// Fallback rate applied when a provider is entirely unrecognized.
///
/// Deliberately higher than any configured provider row so an unknown provider
/// never under-charges a tenant's budget.
const UNKNOWN_PROVIDER_RATE: Rate = Rate { input_cost_per_1k: 0.020, output_cost_per_1k: 0.080 };

/// Manages LLM model pricing data with thread-safe concurrent access.
///
/// Pricing data is loaded from an embedded table at construction and can be
/// hot-reloaded via [`PricingManager::load_from_json`] without interrupting readers.
pub struct PricingManager {
    rates: ArcSwap<HashMap<String, Rate>>,
}

impl PricingManager {
    /// Creates a new `PricingManager` with the built-in rate table.
    pub fn new() -> Self {
        let manager = Self { rates: ArcSwap::from_pointee(HashMap::new()) };
        manager
            .load_from_json(PRICING_JSON)
            .expect("embedded pricing table must parse");
        manager
    }

    /// Replaces the pricing table from a JSON document of `"provider:model" -> Rate`.
    pub fn load_from_json(&self, json_str: &str) -> Result<(), String> {
        let parsed: HashMap<String, Rate> =
            serde_json::from_str(json_str).map_err(|e| format!("failed to parse pricing json: {e}"))?;
        self.rates.store(Arc::new(parsed));
        Ok(())
    }

    /// Looks up the rate for `provider:model`, falling back to `provider:default`,
    /// then to a conservative unknown-provider rate.
    pub fn rate_for(&self, provider: &str, model: &str) -> Rate {
        let table = self.rates.load();
        let key = format!("{provider}:{model}");
        if let Some(rate) = table.get(&key) {
            return *rate;
        }
        let default_key = format!("{provider}:default");
        if let Some(rate) = table.get(&default_key) {
            return *rate;
        }
        UNKNOWN_PROVIDER_RATE
    }

    /// Estimates cost in USD for the given provider/model and token counts.
    pub fn estimate_cost(&self, provider: &str, model: &str, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        self.rate_for(provider, model).cost(prompt_tokens, completion_tokens)
    }
}

impl Default for PricingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_uses_its_own_rate() {
        let pm = PricingManager::new();
        let cost = pm.estimate_cost("anthropic", "claude-opus-4-6", 1000, 1000);
        assert!((cost - (0.015 + 0.075)).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_falls_back_to_provider_default() {
        let pm = PricingManager::new();
        let cost = pm.estimate_cost("openai", "gpt-5-nonexistent", 1000, 0);
        assert!((cost - 0.005).abs() < 1e-9);
    }

    #[test]
    fn unknown_provider_never_undercharges() {
        let pm = PricingManager::new();
        let known_max = pm.estimate_cost("openai", "gpt-4-turbo", 1000, 1000);
        let unknown = pm.estimate_cost("mystery_llm", "foo", 1000, 1000);
        assert!(unknown >= known_max);
    }

    #[test]
    fn more_tokens_costs_more() {
        let pm = PricingManager::new();
        let small = pm.estimate_cost("openai", "gpt-4o", 100, 100);
        let large = pm.estimate_cost("openai", "gpt-4o", 1000, 1000);
        assert!(large > small);
    }

    #[test]
    fn all_configured_providers_have_positive_cost() {
        let pm = PricingManager::new();
        for provider in ["anthropic", "openai", "azure_openai", "gemini"] {
            let cost = pm.estimate_cost(provider, "default", 500, 500);
            assert!(cost > 0.0, "provider {provider} should have a positive cost");
        }
    }
}
