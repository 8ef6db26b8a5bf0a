//! Gateway server binary.
//!
//! ```text
//! gateway --host 0.0.0.0 --port 8000
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use gateway_core::{default_api_keys, load_config, ApiKeyAuthenticator, Pipeline, ProviderCredentials};
use gateway_cost::{PricingManager, TenantBudgetManager};
use gateway_providers::adapters::{AnthropicAdapter, AzureOpenAiAdapter, GeminiAdapter, OpenAiAdapter};
use gateway_providers::router::Router as ProviderRouter;
use gateway_providers::ProviderAdapter;
use gateway_reliability::CircuitBreaker;
use gateway_safety::{Backend, PiiDetector};

#[derive(Parser, Debug)]
#[command(name = "gateway", about = "Enterprise LLM gateway server")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_result = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    match dotenv_result {
        Ok(path) => tracing::debug!("loaded .env from: {:?}", path),
        Err(_) => tracing::debug!("no .env file loaded (not required)"),
    }

    let args = Args::parse();
    let config = load_config();
    let credentials = ProviderCredentials::from_env();

    let detector = PiiDetector::new(
        if config.safety.rich_detection { Backend::Rich } else { Backend::Fallback },
        config.safety.pii_redaction_enabled,
    )
    .with_entities(config.safety.entities.clone());
    let pricing = PricingManager::new();
    let budgets = TenantBudgetManager::new(config.cost.default_daily_budget_usd, config.cost.default_monthly_budget_usd);

    let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
        Box::new(AnthropicAdapter::new(credentials.anthropic_api_key.clone())),
        Box::new(OpenAiAdapter::new(credentials.openai_api_key.clone())),
        Box::new(AzureOpenAiAdapter::new(
            credentials.azure_openai_api_key.clone(),
            credentials.azure_openai_endpoint.clone(),
            credentials.azure_openai_api_version.clone(),
            credentials.azure_openai_deployment.clone(),
        )),
        Box::new(GeminiAdapter::new(credentials.google_api_key.clone())),
    ];
    let breaker = Arc::new(CircuitBreaker::new(config.reliability.failure_threshold, config.reliability.cooldown_seconds));
    let router = ProviderRouter::new(adapters, config.providers.priority.clone(), breaker);

    let audit = gateway_audit::AuditLogger::new(config.audit.log_path.clone().into(), config.audit.siem_webhook_url.clone())?;

    let pipeline = Arc::new(Pipeline::new(detector, pricing, budgets, router, audit));
    let authenticator = Arc::new(ApiKeyAuthenticator::new(default_api_keys()));
    let state = gateway_api::AppState { pipeline, authenticator };

    let app = gateway_api::router(state);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    tracing::info!("gateway listening on http://{}", addr);
    tracing::info!("providers configured: {}", config.providers.priority.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", "));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
