//! Model catalog adapters
//!
//! [`StaticCatalog`] carries the built-in model table; [`load_catalog_file`]
//! reads an operator-supplied JSON list through the same lenient descriptor
//! parser, so older files with legacy field names keep working.

use polychat_application::ports::model_catalog::ModelCatalog;
use polychat_domain::{DomainError, ModelDescriptor, RestrictionClass};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog file must contain a JSON array of models")]
    NotAnArray,
    #[error(transparent)]
    Record(#[from] DomainError),
}

/// Catalog backed by a fixed descriptor list
pub struct StaticCatalog {
    models: Vec<ModelDescriptor>,
}

impl StaticCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// The built-in model table used when no catalog file is configured
    pub fn builtin() -> Self {
        Self::new(builtin_models())
    }
}

impl ModelCatalog for StaticCatalog {
    fn list_models(&self) -> Vec<ModelDescriptor> {
        self.models.clone()
    }
}

/// Load a catalog from a JSON file of model records. Records that fail to
/// parse are skipped with a warning rather than failing the whole file.
pub fn load_catalog_file(path: &Path) -> Result<StaticCatalog, CatalogLoadError> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let entries = value.as_array().ok_or(CatalogLoadError::NotAnArray)?;

    let mut models = Vec::with_capacity(entries.len());
    for entry in entries {
        match ModelDescriptor::from_raw(entry) {
            Ok(model) => models.push(model),
            Err(e) => warn!(error = %e, "skipping malformed catalog record"),
        }
    }
    Ok(StaticCatalog::new(models))
}

fn model(
    id: &str,
    display_name: &str,
    provider: &str,
    input: f64,
    output: f64,
    context: u32,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        display_name: display_name.to_string(),
        provider: provider.to_string(),
        input_price_per_million: input,
        output_price_per_million: output,
        context_window_tokens: context,
        is_active: true,
        restriction: RestrictionClass::None,
    }
}

fn admin_model(
    id: &str,
    display_name: &str,
    provider: &str,
    input: f64,
    output: f64,
    context: u32,
) -> ModelDescriptor {
    ModelDescriptor {
        restriction: RestrictionClass::AdminOnly,
        ..model(id, display_name, provider, input, output, context)
    }
}

fn builtin_models() -> Vec<ModelDescriptor> {
    vec![
        // Premium, frontier
        model("gpt-5.2", "GPT-5.2", "openai", 10.0, 30.0, 128_000),
        model("gpt-5.2-codex", "GPT-5.2 Codex", "openai", 15.0, 45.0, 128_000),
        model("claude-3-5-sonnet", "Claude 3.5 Sonnet", "anthropic", 3.0, 15.0, 200_000),
        model("gemini-3-flash-preview", "Gemini 3 Flash", "google", 0.5, 1.5, 1_048_576),
        model("llama-4-maverick", "Llama 4 Maverick", "meta", 2.0, 6.0, 256_000),
        // Premium, high efficiency
        model("gpt-4o-mini", "GPT-4o Mini", "openai", 0.15, 0.6, 128_000),
        model("deepseek-chat", "DeepSeek V3", "deepseek", 0.14, 0.28, 64_000),
        model("gemini-2.5-flash-lite", "Gemini 2.5 Flash Lite", "google", 0.075, 0.3, 1_048_576),
        model("claude-3-5-haiku", "Claude 3.5 Haiku", "anthropic", 0.25, 1.25, 200_000),
        // Free
        model("google/gemini-2.0-flash-exp:free", "Gemini 2.0 Flash (Free)", "google", 0.0, 0.0, 1_048_576),
        model("meta-llama/llama-3.3-70b-instruct:free", "Llama 3.3 70B (Free)", "meta", 0.0, 0.0, 128_000),
        model("deepseek/deepseek-r1-0528:free", "DeepSeek R1 (Free)", "deepseek", 0.0, 0.0, 64_000),
        model("xiaomi/mimo-v2-flash:free", "Xiaomi MiMo V2 (Free)", "xiaomi", 0.0, 0.0, 128_000),
        model("qwen/qwen3-coder:free", "Qwen 3 Coder (Free)", "alibaba", 0.0, 0.0, 32_000),
        model("mistralai/devstral-2512:free", "Mistral Devstral (Free)", "mistral", 0.0, 0.0, 32_000),
        model("openai/gpt-oss-120b:free", "GPT-OSS 120B (Free)", "openai", 0.0, 0.0, 8_192),
        model("google/gemma-3-27b-it:free", "Gemma 3 27B (Free)", "google", 0.0, 0.0, 131_072),
        // Admin-only search models, dispatched on the restricted lane
        admin_model("perplexity/sonar", "Perplexity Sonar", "perplexity", 1.0, 1.0, 127_000),
        admin_model(
            "perplexity/sonar-deep-research",
            "Perplexity Sonar Deep Research",
            "perplexity",
            2.0,
            8.0,
            127_000,
        ),
    ]
}
