//! Provider adapters and ordered fallback routing for the LLM gateway.
//!
//! [`ProviderAdapter`] is the seam every upstream LLM integration implements.
//! [`router::Router`] walks a priority list of adapters, skipping unconfigured
//! providers and providers whose circuit breaker is open, and falls back to the
//! next candidate on failure.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
pub mod adapters;
#[cfg(feature = "enabled")]
pub mod router;

#[cfg(feature = "enabled")]
mod trait_def {
    use async_trait::async_trait;
    use gateway_types::{AdapterResponse, CompletionRequest, Provider, Result};

    /// A single upstream LLM integration.
    #[async_trait]
    pub trait ProviderAdapter: Send + Sync {
        /// Which provider this adapter speaks to.
        fn name(&self) -> Provider;

        /// True if the adapter has the credentials it needs to be tried at all.
        fn is_available(&self) -> bool;

        /// Model used when the request doesn't name one explicitly.
        fn default_model(&self) -> &str;

        /// Send the request upstream and return its response.
        async fn complete(&self, request: &CompletionRequest) -> Result<AdapterResponse>;
    }

    /// Estimates token count for providers that don't report usage, matching the
    /// convention that roughly 1.3 tokens are produced per whitespace-separated word.
    pub fn estimate_tokens(text: &str) -> u32 {
        let words = text.split_whitespace().count();
        ((words as f64) * 1.3).ceil() as u32
    }
}

#[cfg(feature = "enabled")]
pub use trait_def::{estimate_tokens, ProviderAdapter};
