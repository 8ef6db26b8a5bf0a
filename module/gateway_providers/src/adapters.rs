//! Concrete provider adapters.

use std::time::Duration;

use async_trait::async_trait;
use gateway_types::{AdapterResponse, CompletionRequest, Error, Message, Provider, Result};
use serde_json::{json, Value};

use crate::{estimate_tokens, ProviderAdapter};

const ADAPTER_TIMEOUT: Duration = Duration::from_secs(60);

/// A `reqwest::Client` with the gateway-wide outbound timeout applied, so a
/// hung upstream fails within the circuit breaker's window instead of
/// blocking the request indefinitely.
fn http_client() -> reqwest::Client {
    reqwest::Client::builder().timeout(ADAPTER_TIMEOUT).build().expect("reqwest client builder failed")
}

fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let mut system = None;
    let mut rest = Vec::with_capacity(messages.len());
    for m in messages {
        if m.role == "system" && system.is_none() {
            system = Some(m.content.clone());
        } else {
            rest.push(m);
        }
    }
    (system, rest)
}

fn as_messages_json(messages: &[&Message]) -> Vec<Value> {
    messages.iter().map(|m| json!({ "role": m.role, "content": m.content })).collect()
}

/// Anthropic Messages API.
pub struct AnthropicAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    default_model: String,
}

impl AnthropicAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: http_client(), default_model: "claude-sonnet-4-6".to_string() }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> Provider {
        Provider::Anthropic
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AdapterResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::Provider("anthropic not configured".into()))?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model.clone());
        let (system, rest) = split_system(&request.messages);

        let mut body = json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": as_messages_json(&rest),
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        let resp = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("anthropic request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Provider(format!("anthropic returned status {}", resp.status())));
        }

        let payload: Value =
            resp.json().await.map_err(|e| Error::Provider(format!("anthropic response decode failed: {e}")))?;

        let content = payload["content"][0]["text"].as_str().unwrap_or_default().to_string();
        let prompt_tokens = payload["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = payload["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(AdapterResponse { content, model_used: model, prompt_tokens, completion_tokens, provider: Provider::Anthropic })
    }
}

/// OpenAI Chat Completions API.
pub struct OpenAiAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    default_model: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: http_client(), default_model: "gpt-4o".to_string() }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> Provider {
        Provider::OpenAi
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AdapterResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::Provider("openai not configured".into()))?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model.clone());
        let all: Vec<&Message> = request.messages.iter().collect();

        let body = json!({
            "model": model,
            "messages": as_messages_json(&all),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Provider(format!("openai returned status {}", resp.status())));
        }

        let payload: Value =
            resp.json().await.map_err(|e| Error::Provider(format!("openai response decode failed: {e}")))?;

        let content = payload["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string();
        let prompt_tokens = payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = payload["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(AdapterResponse { content, model_used: model, prompt_tokens, completion_tokens, provider: Provider::OpenAi })
    }
}

/// Azure OpenAI deployment. The "model" is always the configured deployment name.
pub struct AzureOpenAiAdapter {
    api_key: Option<String>,
    endpoint: Option<String>,
    api_version: String,
    deployment: String,
    http: reqwest::Client,
}

impl AzureOpenAiAdapter {
    pub fn new(api_key: Option<String>, endpoint: Option<String>, api_version: String, deployment: String) -> Self {
        Self { api_key, endpoint, api_version, deployment, http: http_client() }
    }
}

#[async_trait]
impl ProviderAdapter for AzureOpenAiAdapter {
    fn name(&self) -> Provider {
        Provider::AzureOpenAi
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.endpoint.is_some()
    }

    fn default_model(&self) -> &str {
        &self.deployment
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AdapterResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::Provider("azure_openai not configured".into()))?;
        let endpoint = self.endpoint.as_ref().ok_or_else(|| Error::Provider("azure_openai endpoint missing".into()))?;
        let all: Vec<&Message> = request.messages.iter().collect();

        let body = json!({
            "messages": as_messages_json(&all),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        );

        let resp = self
            .http
            .post(&url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("azure_openai request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Provider(format!("azure_openai returned status {}", resp.status())));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| Error::Provider(format!("azure_openai response decode failed: {e}")))?;

        let content = payload["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string();
        let prompt_tokens = payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = payload["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(AdapterResponse {
            content,
            model_used: self.deployment.clone(),
            prompt_tokens,
            completion_tokens,
            provider: Provider::AzureOpenAi,
        })
    }
}

/// Google Gemini `generateContent` API. Gemini does not reliably report token
/// usage, so both prompt and completion tokens are estimated from word count.
pub struct GeminiAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    default_model: String,
}

impl GeminiAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: http_client(), default_model: "gemini-1.5-flash".to_string() }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> Provider {
        Provider::Gemini
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AdapterResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::Provider("gemini not configured".into()))?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model.clone());

        let prompt_text: String =
            request.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt_text }] }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": request.temperature,
            }
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key={api_key}"
        );

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("gemini request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Provider(format!("gemini returned status {}", resp.status())));
        }

        let payload: Value =
            resp.json().await.map_err(|e| Error::Provider(format!("gemini response decode failed: {e}")))?;

        let content =
            payload["candidates"][0]["content"]["parts"][0]["text"].as_str().unwrap_or_default().to_string();

        let prompt_tokens = estimate_tokens(&prompt_text);
        let completion_tokens = estimate_tokens(&content);

        Ok(AdapterResponse { content, model_used: model, prompt_tokens, completion_tokens, provider: Provider::Gemini })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_types::Message;

    #[test]
    fn split_system_extracts_only_first_system_message() {
        let messages = vec![
            Message { role: "system".into(), content: "be terse".into() },
            Message { role: "user".into(), content: "hi".into() },
        ];
        let (system, rest) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("be terse"));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].role, "user");
    }

    #[test]
    fn unconfigured_adapters_report_unavailable() {
        assert!(!AnthropicAdapter::new(None).is_available());
        assert!(!OpenAiAdapter::new(None).is_available());
        assert!(!GeminiAdapter::new(None).is_available());
        assert!(!AzureOpenAiAdapter::new(None, None, "2024-02-01".into(), "gpt-4o".into()).is_available());
    }

    #[test]
    fn azure_default_model_is_the_deployment_name() {
        let adapter = AzureOpenAiAdapter::new(
            Some("key".into()),
            Some("https://acme.openai.azure.com".into()),
            "2024-02-01".into(),
            "acme-gpt4o".into(),
        );
        assert_eq!(adapter.default_model(), "acme-gpt4o");
    }

    #[test]
    fn default_models_match_provider_conventions() {
        assert_eq!(AnthropicAdapter::new(None).default_model(), "claude-sonnet-4-6");
        assert_eq!(OpenAiAdapter::new(None).default_model(), "gpt-4o");
        assert_eq!(GeminiAdapter::new(None).default_model(), "gemini-1.5-flash");
    }

    #[test]
    fn http_client_has_the_60s_adapter_timeout() {
        // reqwest::Client doesn't expose a configured timeout for inspection, so
        // this just confirms the builder call succeeds rather than panicking.
        let _ = http_client();
    }
}
