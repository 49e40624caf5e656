//! CLI entrypoint for polychat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod format;

use anyhow::{Context, Result, bail};
use args::{Cli, Command, OutputFormat};
use clap::Parser;
use polychat_application::{
    AuditSink, HealthStore, ModelCatalog, NoAudit, RunSynthesisInput, RunSynthesisUseCase,
    SendMessageUseCase,
};
use polychat_domain::{Message, RetryPolicy};
use polychat_infrastructure::health::fresh_rows;
use polychat_infrastructure::providers::UpstreamClient;
use polychat_infrastructure::{
    ConfigIdentityProvider, ConfigLoader, DispatchGateway, FileConfig, FileHealthStore,
    InMemoryHealthStore, JsonlAuditSink, ModelRouter, OpenRouterClient, PerplexityClient,
    StaticCatalog, TokioSleeper, load_catalog_file,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    config.validate()?;

    let catalog = load_catalog(&config)?;

    let health = build_health(&config);

    match cli.command {
        // Listing needs no credentials or network wiring. Observations come
        // from the shared health snapshot; without one configured a fresh
        // process lists unannotated.
        Command::Models => {
            print!(
                "{}",
                format::format_catalog(&catalog.list_models(), &fresh_rows(health.snapshot()))
            );
        }
        Command::Ask { prompt, model } => {
            let gateway = Arc::new(build_gateway(&config, catalog.as_ref(), health)?);
            let identity = Arc::new(ConfigIdentityProvider::new(config.identity.to_caller()));
            let use_case =
                SendMessageUseCase::new(gateway, catalog, identity, build_audit(&config));
            let reply = use_case.execute(&[Message::user(&prompt)], &model).await?;
            info!(model = %reply.model, "reply received");
            println!("{}", reply.content);
        }
        Command::Synthesize {
            prompt,
            models,
            output,
        } => {
            let gateway = Arc::new(build_gateway(&config, catalog.as_ref(), health)?);
            let identity = Arc::new(ConfigIdentityProvider::new(config.identity.to_caller()));
            let use_case = RunSynthesisUseCase::new(
                gateway,
                catalog,
                identity,
                build_audit(&config),
                Arc::new(TokioSleeper),
                config.synthesis.to_settings(),
            );
            let outcome = use_case
                .execute(RunSynthesisInput::new(&prompt, models))
                .await?;

            let text = match output {
                OutputFormat::Full => format::format_full(&prompt, &outcome),
                OutputFormat::Synthesis => format::format_synthesis_only(&outcome),
                OutputFormat::Json => format::format_json(&outcome),
            };
            println!("{}", text);
        }
    }

    Ok(())
}

fn load_catalog(config: &FileConfig) -> Result<Arc<StaticCatalog>> {
    let catalog = match &config.catalog.path {
        Some(path) => load_catalog_file(Path::new(path))
            .with_context(|| format!("loading model catalog from {}", path))?,
        None => StaticCatalog::builtin(),
    };
    Ok(Arc::new(catalog))
}

fn build_health(config: &FileConfig) -> Arc<dyn HealthStore> {
    match &config.health.path {
        Some(path) => match FileHealthStore::open(path) {
            Some(store) => {
                info!(path, "health snapshot enabled");
                Arc::new(store)
            }
            None => {
                warn!(path, "health snapshot could not be opened, keeping health in memory");
                Arc::new(InMemoryHealthStore::new())
            }
        },
        None => Arc::new(InMemoryHealthStore::new()),
    }
}

fn build_gateway(
    config: &FileConfig,
    catalog: &dyn ModelCatalog,
    health: Arc<dyn HealthStore>,
) -> Result<DispatchGateway> {
    let openrouter_key = std::env::var(&config.providers.openrouter.api_key_env)
        .with_context(|| {
            format!(
                "missing API key: set the {} environment variable",
                config.providers.openrouter.api_key_env
            )
        })?;
    // The restricted lane is admin-only; a missing key only matters if a
    // restricted model is actually dispatched, and then fails as a 401.
    let perplexity_key =
        std::env::var(&config.providers.perplexity.api_key_env).unwrap_or_default();

    let http = reqwest::Client::new();

    let primary: Arc<dyn UpstreamClient> = Arc::new(OpenRouterClient::new(
        http.clone(),
        config
            .providers
            .openrouter
            .base_url
            .clone()
            .unwrap_or_else(|| {
                polychat_infrastructure::providers::openrouter::DEFAULT_BASE_URL.to_string()
            }),
        openrouter_key,
    ));
    let restricted: Arc<dyn UpstreamClient> = Arc::new(PerplexityClient::new(
        http,
        config
            .providers
            .perplexity
            .base_url
            .clone()
            .unwrap_or_else(|| {
                polychat_infrastructure::providers::perplexity::DEFAULT_BASE_URL.to_string()
            }),
        perplexity_key,
    ));

    if config.http.max_retries == 0 {
        bail!("http.max_retries cannot be 0");
    }

    Ok(DispatchGateway::new(
        ModelRouter::from_catalog(catalog),
        primary,
        restricted,
        health,
        Arc::new(TokioSleeper),
    )
    .with_call_timeout(config.http.timeout())
    .with_retry_policy(RetryPolicy::new(config.http.max_retries)))
}

fn build_audit(config: &FileConfig) -> Arc<dyn AuditSink> {
    match &config.audit.path {
        Some(path) => match JsonlAuditSink::new(path) {
            Some(sink) => {
                info!(path, "audit log enabled");
                Arc::new(sink)
            }
            None => {
                warn!(path, "audit log could not be opened, auditing disabled");
                Arc::new(NoAudit)
            }
        },
        None => Arc::new(NoAudit),
    }
}
