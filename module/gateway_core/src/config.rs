//! Environment-driven configuration.
//!
//! Every setting has a sane default so the gateway starts with zero
//! configuration; production deployments override via env vars. Provider
//! credentials live outside [`gateway_types::Config`] since they're secrets,
//! not policy, and should never round-trip through a config-dump endpoint.

use gateway_types::{AuditConfig, Config, CostConfig, Provider, ProvidersConfig, ReliabilityConfig, SafetyConfig};

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Upstream provider credentials. Loaded from env vars, never logged or
/// returned from any API response.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_api_version: String,
    pub azure_openai_deployment: String,
    pub google_api_key: Option<String>,
}

impl ProviderCredentials {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            azure_openai_api_key: std::env::var("AZURE_OPENAI_API_KEY").ok(),
            azure_openai_endpoint: std::env::var("AZURE_OPENAI_ENDPOINT").ok(),
            azure_openai_api_version: env_string("AZURE_OPENAI_API_VERSION", "2024-02-01"),
            azure_openai_deployment: env_string("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
        }
    }
}

/// Gateway API keys mapped to the tenant they authenticate as.
///
/// Hardcoded defaults mirror a POC deployment; production should load these
/// from a secrets store rather than the process environment.
pub fn default_api_keys() -> Vec<(String, String)> {
    let mut keys = vec![
        ("sk-gateway-finance-001".to_string(), "finance-team".to_string()),
        ("sk-gateway-engineering-001".to_string(), "engineering-team".to_string()),
        ("sk-gateway-marketing-001".to_string(), "marketing-team".to_string()),
        ("sk-gateway-default-001".to_string(), "default".to_string()),
    ];
    if let Ok(extra) = std::env::var("GATEWAY_API_KEY") {
        keys.push((extra, env_string("GATEWAY_API_KEY_TENANT", "default")));
    }
    keys
}

/// Loads [`Config`] from environment variables, falling back to defaults that
/// mirror the original POC's settings.
pub fn load_config() -> Config {
    let priority = env_string("PROVIDER_PRIORITY", "anthropic,openai,azure_openai,gemini")
        .split(',')
        .filter_map(|s| Provider::parse(s.trim()))
        .collect();

    Config {
        safety: SafetyConfig {
            pii_redaction_enabled: env_bool("PII_REDACTION_ENABLED", true),
            rich_detection: env_bool("PII_RICH_DETECTION", false),
            entities: env_string(
                "PII_ENTITIES",
                "PERSON,EMAIL_ADDRESS,PHONE_NUMBER,CREDIT_CARD,US_SSN,IP_ADDRESS,LOCATION,DATE_TIME",
            )
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        },
        cost: CostConfig {
            default_daily_budget_usd: env_f64("DEFAULT_TEAM_DAILY_BUDGET_USD", 10.0),
            default_monthly_budget_usd: env_f64("DEFAULT_TEAM_MONTHLY_BUDGET_USD", 200.0),
        },
        reliability: ReliabilityConfig {
            failure_threshold: env_u32("CIRCUIT_BREAKER_FAILURE_THRESHOLD", gateway_reliability::DEFAULT_FAILURE_THRESHOLD),
            cooldown_seconds: env_u64("CIRCUIT_BREAKER_COOLDOWN_SECONDS", gateway_reliability::DEFAULT_COOLDOWN_SECONDS),
        },
        providers: ProvidersConfig { priority },
        audit: AuditConfig {
            log_path: env_string("AUDIT_LOG_FILE", "audit_logs/gateway_audit.jsonl"),
            siem_webhook_url: std::env::var("SIEM_WEBHOOK_URL").ok(),
        },
    }
}
