//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and use-case
//! types at the wiring seam.

use polychat_application::use_cases::run_synthesis::SynthesisSettings;
use polychat_domain::{Caller, CallerRole};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("http.timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("synthesis.chunk_size cannot be 0")]
    InvalidChunkSize,

    #[error("synthesis model name cannot be empty")]
    EmptySynthesisModel,
}

/// One upstream provider's settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Override for the provider base URL
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: String::new(),
            base_url: None,
        }
    }
}

/// Provider settings for both dispatch lanes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openrouter: ProviderConfig,
    pub perplexity: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openrouter: ProviderConfig {
                api_key_env: "OPENROUTER_API_KEY".to_string(),
                base_url: None,
            },
            perplexity: ProviderConfig {
                api_key_env: "PERPLEXITY_API_KEY".to_string(),
                base_url: None,
            },
        }
    }
}

/// HTTP call budget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-call time budget in seconds
    pub timeout_secs: u64,
    /// Attempts per model before giving up
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 3,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fan-out and synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Models dispatched concurrently per chunk
    pub chunk_size: usize,
    /// Pause between chunks in milliseconds
    pub pause_ms: u64,
    /// Synthesizer when every target is free tier
    pub free_model: String,
    /// Synthesizer when any target is premium tier
    pub premium_model: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let defaults = SynthesisSettings::default();
        Self {
            chunk_size: defaults.chunk_size,
            pause_ms: defaults.inter_chunk_pause.as_millis() as u64,
            free_model: defaults.free_synthesis_model,
            premium_model: defaults.premium_synthesis_model,
        }
    }
}

impl SynthesisConfig {
    pub fn to_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            chunk_size: self.chunk_size,
            inter_chunk_pause: Duration::from_millis(self.pause_ms),
            free_synthesis_model: self.free_model.clone(),
            premium_synthesis_model: self.premium_model.clone(),
        }
    }
}

/// Who the process acts as
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub authenticated: bool,
    /// "user" or "admin"
    pub role: String,
    pub email: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            authenticated: false,
            role: "user".to_string(),
            email: None,
        }
    }
}

impl IdentityConfig {
    pub fn to_caller(&self) -> Caller {
        let role = if self.role.eq_ignore_ascii_case("admin") {
            CallerRole::Admin
        } else {
            CallerRole::User
        };
        Caller {
            authenticated: self.authenticated,
            role,
            email: self.email.clone(),
        }
    }
}

/// Prompt/result audit log settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// JSONL file path; audit is disabled when unset
    pub path: Option<String>,
}

/// Health snapshot persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// JSON snapshot file shared across invocations; health stays
    /// process-local when unset
    pub path: Option<String>,
}

/// Model catalog source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog file; the built-in table is used when unset
    pub path: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub providers: ProvidersConfig,
    pub http: HttpConfig,
    pub synthesis: SynthesisConfig,
    pub identity: IdentityConfig,
    pub audit: AuditConfig,
    pub health: HealthConfig,
    pub catalog: CatalogConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.synthesis.chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize);
        }
        if self.synthesis.free_model.trim().is_empty()
            || self.synthesis.premium_model.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptySynthesisModel);
        }
        Ok(())
    }
}
